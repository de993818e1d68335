use crate::catalog::DisplayModel;
use crate::ui::renderfns::{accent_color, icon_glyph};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Everything known about one model
pub struct ModelDetailView {
  model: DisplayModel,
}

impl ModelDetailView {
  pub fn new(model: DisplayModel) -> Self {
    Self { model }
  }

  fn field_lines(&self) -> Vec<Line<'_>> {
    let model = &self.model;
    let field = |label: &'static str, value: String| {
      Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
      ])
    };

    vec![
      field("Id:", model.id.to_string()),
      field("Link:", model.path.clone()),
      field("Features:", model.stats.clone()),
      field("Accuracy:", model.accuracy.clone()),
      field(
        "Category:",
        model.fetched.category.clone().unwrap_or_default(),
      ),
      field(
        "Live URL:",
        model.fetched.live_url.clone().unwrap_or_default(),
      ),
      field("Catalog id:", model.fetched.id.to_string()),
    ]
  }
}

impl View for ModelDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let accent = accent_color(self.model.color);
    let block = Block::default()
      .title(format!(" {} {} ", icon_glyph(self.model.icon), self.model.name))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(7), // Fields
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Description
      ])
      .split(inner);

    frame.render_widget(Paragraph::new(self.field_lines()), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let description = if self.model.description.is_empty() {
      "No description"
    } else {
      self.model.description.as_str()
    };
    frame.render_widget(
      Paragraph::new(description).wrap(Wrap { trim: true }),
      chunks[2],
    );
  }

  fn breadcrumb_label(&self) -> String {
    self.model.name.clone()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "back")]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::derive_models;
  use crate::upstream::Catalog;
  use crossterm::event::KeyModifiers;
  use serde_json::json;

  fn detail() -> ModelDetailView {
    let models = derive_models(
      &Catalog::new(vec![json!({
        "id": 17,
        "title": "Churn",
        "category": "Machine Learning",
        "liveUrl": "https://x/customer-churn-prediction",
        "modelAccuracy": "88.6"
      })]),
      "",
    );
    ModelDetailView::new(models[0].clone())
  }

  #[test]
  fn test_fields_include_catalog_data() {
    let view = detail();
    let text: Vec<String> = view
      .field_lines()
      .iter()
      .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
      .collect();

    assert!(text.contains(&format!("{:<12}{}", "Id:", "3")));
    assert!(text.contains(&format!("{:<12}{}", "Accuracy:", "89% Accuracy")));
    assert!(text.contains(&format!("{:<12}{}", "Catalog id:", "17")));
    assert!(text.contains(&format!(
      "{:<12}{}",
      "Live URL:", "https://x/customer-churn-prediction"
    )));
  }

  #[test]
  fn test_escape_goes_back() {
    let mut view = detail();
    let action = view.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert!(matches!(action, ViewAction::Pop));
    assert_eq!(view.breadcrumb_label(), "Churn");
  }
}
