use crate::query::{Query, QueryState};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::upstream::client::join_url;
use crate::upstream::{Endpoints, Upstream, UpstreamClient};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use serde_json::Value;

const HEALTH_PATH: &str = "/health";

/// Live status of the ML backend
pub struct HealthView {
  query: Query<Value>,
}

impl HealthView {
  pub fn new(client: UpstreamClient, endpoints: Endpoints) -> Self {
    let mut query = Query::new(move || {
      let client = client.clone();
      let base = endpoints.base(Upstream::MlBackend).map(str::to_string);
      async move {
        let base = base.map_err(|e| e.to_string())?;
        client
          .get_json(&join_url(&base, HEALTH_PATH))
          .await
          .map_err(|e| e.to_string())
      }
    });

    query.fetch();

    Self { query }
  }
}

/// One line per field; nested values are shown as compact JSON.
pub fn health_lines(payload: &Value) -> Vec<(String, String)> {
  match payload {
    Value::Object(map) => map
      .iter()
      .map(|(key, value)| {
        let shown = match value {
          Value::String(s) => s.clone(),
          Value::Null => "-".to_string(),
          other => other.to_string(),
        };
        (key.clone(), shown)
      })
      .collect(),
    other => vec![("response".to_string(), other.to_string())],
  }
}

fn value_color(key: &str, value: &str) -> Color {
  if key != "status" {
    return Color::White;
  }
  match value.to_ascii_lowercase().as_str() {
    "ok" | "healthy" | "up" => Color::Green,
    _ => Color::Yellow,
  }
}

impl View for HealthView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.refresh();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = match self.query.state() {
      QueryState::Loading => " ML backend (checking...) ".to_string(),
      QueryState::Error(_) => " ML backend (unreachable) ".to_string(),
      _ => " ML backend ".to_string(),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = match self.query.state() {
      QueryState::Success(payload) => {
        let lines: Vec<Line> = health_lines(payload)
          .into_iter()
          .map(|(key, value)| {
            let color = value_color(&key, &value);
            Line::from(vec![
              Span::styled(format!("{:<14}", key), Style::default().fg(Color::DarkGray)),
              Span::styled(value, Style::default().fg(color)),
            ])
          })
          .collect();
        Paragraph::new(lines)
      }
      QueryState::Error(e) => Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", e))
        .style(Style::default().fg(Color::Red)),
      _ => Paragraph::new("Checking ML backend...").style(Style::default().fg(Color::DarkGray)),
    };

    frame.render_widget(paragraph.block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    "Health".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn refresh(&mut self) {
    self.query.refetch();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("r", "refresh"), ShortcutInfo::new("q", "back")]
  }
}
