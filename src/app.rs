use crate::catalog::CatalogService;
use crate::event::{Event, EventHandler};
use crate::ui::components::{CommandPalette, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{GalleryView, HealthView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use std::io::stdout;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(100);

/// Terminal gallery: a stack of views with the model grid at the root
pub struct App {
  /// Navigation stack - root is always the gallery
  view_stack: Vec<Box<dyn View>>,
  palette: CommandPalette,
  service: CatalogService,
  host: Option<String>,
  /// One-line message shown in the footer until the next key
  status: Option<String>,
  should_quit: bool,
}

impl App {
  pub fn new(service: CatalogService) -> Self {
    let host = service.endpoints().portfolio_host();
    let root: Box<dyn View> = Box::new(GalleryView::new(service.clone()));

    Self {
      view_stack: vec![root],
      palette: CommandPalette::new(),
      service,
      host,
      status: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Current view
        Constraint::Length(1), // Footer
      ])
      .split(frame.area());

    let shortcuts = self
      .view_stack
      .last()
      .map(|view| view.shortcuts())
      .unwrap_or_default();
    draw_header(frame, chunks[0], self.host.as_deref(), &shortcuts);

    if let Some(view) = self.view_stack.last_mut() {
      view.render(frame, chunks[1]);
    }

    draw_footer(frame, chunks[2], &self.breadcrumb());
    if let Some(status) = &self.status {
      let message = Paragraph::new(format!("{} ", status))
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::Yellow));
      frame.render_widget(message, chunks[2]);
    }

    self.palette.render_overlay(frame, chunks[1]);
  }

  fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect()
  }

  /// Every view polls, so the gallery keeps reconciling under a pushed view
  fn tick(&mut self) {
    for view in self.view_stack.iter_mut() {
      view.tick();
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }
    self.status = None;

    match self.palette.handle_key(key) {
      KeyResult::Handled => return,
      KeyResult::Event(command) => {
        self.execute_command(&command);
        return;
      }
      KeyResult::NotHandled => {}
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, command: &str) {
    tracing::debug!(command, "executing command");
    match command {
      "models" => self.view_stack.truncate(1),
      "health" => {
        self.view_stack.truncate(1);
        self.view_stack.push(Box::new(HealthView::new(
          self.service.client().clone(),
          self.service.endpoints().clone(),
        )));
      }
      "refresh" => {
        if let Some(view) = self.view_stack.last_mut() {
          view.refresh();
        }
      }
      "quit" => self.should_quit = true,
      "" => {}
      other => self.status = Some(format!("Unknown command: {}", other)),
    }
  }
}
