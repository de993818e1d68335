use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Most suggestions shown at once
const MAX_SUGGESTIONS: usize = 6;

/// `:` command palette with autocomplete
#[derive(Debug, Clone, Default)]
pub struct CommandPalette {
  buffer: String,
  active: bool,
  selected: usize,
}

impl CommandPalette {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  fn reset(&mut self) {
    self.active = false;
    self.buffer.clear();
    self.selected = 0;
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.buffer)
  }

  /// Handle a key; `:` activates the palette when it is closed.
  ///
  /// Emits the resolved command name on Enter.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<String> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.active = true;
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.reset();
        KeyResult::Handled
      }
      KeyCode::Enter => {
        let command = self.resolve();
        self.reset();
        KeyResult::Event(command)
      }
      KeyCode::Tab | KeyCode::Down => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected = (self.selected + 1) % count;
        }
        KeyResult::Handled
      }
      KeyCode::BackTab | KeyCode::Up => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected = self.selected.checked_sub(1).unwrap_or(count - 1);
        }
        KeyResult::Handled
      }
      KeyCode::Backspace => {
        self.buffer.pop();
        self.selected = 0;
        KeyResult::Handled
      }
      KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.buffer.clear();
        self.selected = 0;
        KeyResult::Handled
      }
      KeyCode::Char(c) => {
        self.buffer.push(c);
        self.selected = 0;
        KeyResult::Handled
      }
      // Swallow everything else while open
      _ => KeyResult::Handled,
    }
  }

  /// Selected suggestion, or the raw input when nothing matches
  fn resolve(&self) -> String {
    match self.suggestions().get(self.selected) {
      Some(cmd) => cmd.name.to_string(),
      None => self.buffer.trim().to_lowercase(),
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let shown = suggestions.len().min(MAX_SUGGESTIONS) as u16;
    let width = (area.width / 10 * 6).clamp(30, 60).min(area.width);
    let height = (3 + shown).min(area.height);
    let overlay = Rect::new(area.x + 1, area.y + 1, width.saturating_sub(1), height);

    frame.render_widget(Clear, overlay);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    if inner.height == 0 {
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(0)])
      .split(inner);

    let input_line = Line::from(vec![
      Span::styled(":", Style::default().fg(Color::Yellow)),
      Span::raw(self.buffer.as_str()),
      Span::styled("_", Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(input_line), chunks[0]);

    if suggestions.is_empty() || chunks[1].height == 0 {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(MAX_SUGGESTIONS)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<10}", cmd.name), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default();
    state.select(Some(self.selected));
    frame.render_stateful_widget(list, chunks[1], &mut state);
  }
}
