use crate::catalog::{CatalogEvent, CatalogService, DisplayModel, ReconcileOutcome};
use crate::ui::renderfns::{accent_color, icon_glyph, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::ModelDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use tokio::sync::mpsc::{self, error::TryRecvError};

/// The grid is padded to at least this many slots
pub const MIN_SLOTS: usize = 4;

const CARD_HEIGHT: u16 = 8;

/// What occupies one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
  Skeleton,
  Card(usize),
  ComingSoon,
}

/// Cells for the current state: skeletons while loading, otherwise the
/// models followed by "Coming Soon" padding up to `MIN_SLOTS`.
pub fn grid_slots(loading: bool, count: usize) -> Vec<Slot> {
  if loading {
    return vec![Slot::Skeleton; MIN_SLOTS];
  }
  let padding = MIN_SLOTS.saturating_sub(count);
  (0..count)
    .map(Slot::Card)
    .chain(std::iter::repeat(Slot::ComingSoon).take(padding))
    .collect()
}

/// Cards per row for a given width
pub fn columns_for_width(width: u16) -> usize {
  match width {
    w if w >= 100 => 4,
    w if w >= 50 => 2,
    _ => 1,
  }
}

/// Card grid fed by a background catalog reconciliation
pub struct GalleryView {
  service: CatalogService,
  events: Option<mpsc::UnboundedReceiver<CatalogEvent>>,
  models: Vec<DisplayModel>,
  loading: bool,
  selected: usize,
  columns: usize,
  last_outcome: Option<ReconcileOutcome>,
}

impl GalleryView {
  pub fn new(service: CatalogService) -> Self {
    let mut view = Self {
      service,
      events: None,
      models: Vec::new(),
      loading: true,
      selected: 0,
      columns: 1,
      last_outcome: None,
    };
    view.activate();
    view
  }

  /// Start a fresh reconciliation, dropping any one still in flight
  fn activate(&mut self) {
    self.loading = true;
    self.last_outcome = None;
    self.events = Some(self.service.spawn_reconcile());
  }

  /// Apply whatever the reconciler has sent since the last tick
  fn drain_events(&mut self) {
    let mut pending = Vec::new();
    let mut disconnected = false;

    if let Some(rx) = self.events.as_mut() {
      loop {
        match rx.try_recv() {
          Ok(event) => pending.push(event),
          Err(TryRecvError::Empty) => break,
          Err(TryRecvError::Disconnected) => {
            disconnected = true;
            break;
          }
        }
      }
    }

    for event in pending {
      match event {
        CatalogEvent::Show(models) => {
          self.models = models;
          self.loading = false;
        }
        CatalogEvent::Clear => {
          self.models.clear();
          self.loading = false;
        }
        CatalogEvent::Reload => {
          tracing::debug!("catalog changed, reactivating gallery");
          self.activate();
          // Anything left belongs to the superseded run
          return;
        }
        CatalogEvent::Finished(outcome) => {
          self.last_outcome = Some(outcome);
        }
      }
    }

    if disconnected {
      self.events = None;
      self.loading = false;
    }
    self.clamp_selection();
  }

  fn clamp_selection(&mut self) {
    self.selected = self.selected.min(self.models.len().saturating_sub(1));
  }

  fn move_selection(&mut self, delta: isize) {
    if self.models.is_empty() {
      return;
    }
    let last = self.models.len() - 1;
    let next = self.selected as isize + delta;
    self.selected = next.clamp(0, last as isize) as usize;
  }

  fn title(&self) -> String {
    if self.loading {
      return " ML Models (loading...) ".to_string();
    }
    match self.last_outcome {
      Some(ReconcileOutcome::Failed) => format!(" ML Models ({}, refresh failed) ", self.models.len()),
      _ => format!(" ML Models ({}) ", self.models.len()),
    }
  }

  fn render_grid(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    self.columns = columns_for_width(inner.width);
    let slots = grid_slots(self.loading, self.models.len());
    let rows: Vec<&[Slot]> = slots.chunks(self.columns).collect();

    // Scroll so the selected row stays visible
    let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = self.selected / self.columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let row_areas = Layout::default()
      .direction(Direction::Vertical)
      .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
      .split(inner);

    for (row_area, row) in row_areas.iter().zip(rows.iter().skip(first_row)) {
      let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, self.columns as u32); self.columns])
        .split(*row_area);

      for (cell, slot) in cells.iter().zip(row.iter()) {
        match *slot {
          Slot::Skeleton => render_skeleton(frame, *cell),
          Slot::ComingSoon => render_coming_soon(frame, *cell),
          Slot::Card(index) => {
            if let Some(model) = self.models.get(index) {
              render_card(frame, *cell, model, index == self.selected);
            }
          }
        }
      }
    }
  }
}

fn render_card(frame: &mut Frame, area: Rect, model: &DisplayModel, selected: bool) {
  let accent = accent_color(model.color);
  let border = if selected {
    BorderType::Thick
  } else {
    BorderType::Rounded
  };

  let block = Block::default()
    .borders(Borders::ALL)
    .border_type(border)
    .border_style(Style::default().fg(accent))
    .title(Line::from(vec![
      Span::styled(format!(" {} ", icon_glyph(model.icon)), Style::default().fg(accent).bold()),
      Span::styled(format!("{} ", model.name), Style::default().fg(Color::White).bold()),
    ]));

  let width = area.width.saturating_sub(2) as usize;
  let lines = vec![
    Line::from(Span::styled(
      truncate(&model.description, width * 3),
      Style::default().fg(Color::Gray),
    )),
    Line::default(),
    Line::from(vec![
      Span::styled("◆ ", Style::default().fg(accent)),
      Span::raw(model.stats.as_str()),
    ]),
    Line::from(vec![
      Span::styled("◆ ", Style::default().fg(accent)),
      Span::raw(model.accuracy.as_str()),
    ]),
  ];

  let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}

fn render_skeleton(frame: &mut Frame, area: Rect) {
  let width = area.width.saturating_sub(4) as usize;
  let bar = |fraction: usize| Line::from("░".repeat(width * fraction / 4));
  let lines = vec![bar(3), Line::default(), bar(4), bar(2), Line::default(), bar(1)];

  let paragraph = Paragraph::new(lines)
    .style(Style::default().fg(Color::DarkGray))
    .block(
      Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray)),
    );
  frame.render_widget(paragraph, area);
}

fn render_coming_soon(frame: &mut Frame, area: Rect) {
  let lines = vec![
    Line::default(),
    Line::from(Span::styled("+", Style::default().fg(Color::Gray).bold())),
    Line::from(Span::styled("Coming Soon", Style::default().fg(Color::Gray).bold())),
    Line::from(Span::styled(
      "New model in development",
      Style::default().fg(Color::DarkGray),
    )),
  ];

  let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
    Block::default()
      .borders(Borders::ALL)
      .border_type(BorderType::Rounded)
      .border_style(Style::default().fg(Color::DarkGray)),
  );
  frame.render_widget(paragraph, area);
}

impl View for GalleryView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let columns = self.columns as isize;
    match key.code {
      KeyCode::Left | KeyCode::Char('h') => self.move_selection(-1),
      KeyCode::Right | KeyCode::Char('l') => self.move_selection(1),
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-columns),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(columns),
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Enter => {
        if let Some(model) = self.models.get(self.selected) {
          return ViewAction::Push(Box::new(ModelDetailView::new(model.clone())));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_grid(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Models".to_string()
  }

  fn tick(&mut self) {
    self.drain_events();
  }

  fn refresh(&mut self) {
    self.activate();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("enter", "open").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(25),
      ShortcutInfo::new("q", "quit").with_priority(30),
    ]
  }
}
