//! Palette commands and their autocomplete ranking.

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "models",
    aliases: &["m", "gallery", "home"],
    description: "Browse the model gallery",
  },
  Command {
    name: "health",
    aliases: &["h", "status"],
    description: "ML backend health",
  },
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Re-check the catalog",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit ml-gallery",
  },
];

/// Match rank of `input` against a command; lower is better.
fn rank(cmd: &Command, input: &str) -> Option<u8> {
  let alias = |test: &dyn Fn(&str) -> bool| cmd.aliases.iter().any(|a| test(a));

  if cmd.name == input {
    Some(0)
  } else if alias(&|a| a == input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if alias(&|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if alias(&|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

/// Commands matching the typed input, best match first; empty input lists all.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();

  let mut ranked: Vec<(u8, &'static Command)> = COMMANDS
    .iter()
    .filter_map(|cmd| rank(cmd, &input).map(|r| (r, cmd)))
    .collect();

  // Stable: equal ranks keep table order
  ranked.sort_by_key(|(r, _)| *r);
  ranked.into_iter().map(|(_, cmd)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("health");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "health");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("gallery");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "models");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("ref");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("ode");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "models");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("zzz").is_empty());
  }
}
