use crate::catalog::{Accent, Icon};
use ratatui::prelude::Color;

/// Truncate to at most `max_len` characters, ending in "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Terminal stand-in for a card icon
pub fn icon_glyph(icon: Icon) -> &'static str {
  match icon {
    Icon::Activity => "∿",
    Icon::Heart => "♥",
    Icon::UserSearch => "⚲",
    Icon::Home => "⌂",
    Icon::ShoppingCart => "¤",
    Icon::Plus => "+",
  }
}

pub fn accent_color(accent: Accent) -> Color {
  match accent {
    Accent::Purple => Color::Magenta,
    Accent::Red => Color::Red,
    Accent::Amber => Color::Yellow,
    Accent::Teal => Color::Cyan,
    Accent::Gray => Color::Gray,
  }
}
