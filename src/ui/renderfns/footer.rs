use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Footer line: the view stack as a breadcrumb, current view last
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String]) {
  let last = breadcrumb.len().saturating_sub(1);
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
    }
    let style = if i == last {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(part.as_str(), style));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
