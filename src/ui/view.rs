use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// Header hint: `<key> label`, sorted by `priority` (lowest first)
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8,
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// What the app should do with the view stack after a key
pub enum ViewAction {
  None,
  Push(Box<dyn View>),
  /// Go back; popping the root view quits
  Pop,
}

/// A screen on the app's view stack.
///
/// The app offers keys to the command palette first and to the top view
/// second. Every view on the stack is ticked, so background work keeps
/// landing while another view is on top.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Label shown in the footer breadcrumb
  fn breadcrumb_label(&self) -> String;

  /// Poll background work
  fn tick(&mut self) {}

  /// Run by the `refresh` command
  fn refresh(&mut self) {}

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
