use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::movies::{CachedMovieClient, MovieClient};
use crate::notify::{self, NotificationCenter};
use crate::ui::components::render_toast;
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::MovieListView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(250);

/// Main application state
pub struct App {
  /// Navigation stack - the movie list is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Toasts raised by writes
  notifications: NotificationCenter,

  /// Application configuration
  config: Config,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let (notifier, notifications) = notify::channel();
    let client = CachedMovieClient::new(MovieClient::new(&config)?, notifier);

    Ok(Self {
      view_stack: vec![Box::new(MovieListView::new(client))],
      notifications,
      config,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);
    info!("app started");

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    info!("app stopped");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.tick(),
      Event::Resize => {} // Redrawn on the next loop iteration
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if let Some(view) = self.view_stack.last_mut() {
      let action = view.handle_key(key);
      self.apply(action);
    }
  }

  fn tick(&mut self) {
    self.notifications.tick();

    // Every view polls so the list underneath a form stays current, but
    // only the top view may change the stack
    let top = self.view_stack.len().saturating_sub(1);
    let mut top_action = ViewAction::None;
    for (i, view) in self.view_stack.iter_mut().enumerate() {
      let action = view.tick();
      if i == top {
        top_action = action;
      }
    }
    self.apply(top_action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        debug!(view = %view.breadcrumb_label(), "push view");
        self.view_stack.push(view);
      }
      ViewAction::Pop => {
        self.view_stack.pop();
        if self.view_stack.is_empty() {
          self.should_quit = true;
        }
      }
    }
  }

  fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  fn draw(&mut self, frame: &mut Frame) {
    let [header, body, footer] = Layout::vertical([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Breadcrumb
    ])
    .areas(frame.area());

    let breadcrumb = self.breadcrumb();
    let Some(view) = self.view_stack.last_mut() else {
      return;
    };

    draw_header(
      frame,
      header,
      &self.config.supabase.url,
      self.config.title(),
      &view.shortcuts(),
    );
    view.render(frame, body);
    draw_footer(frame, footer, &breadcrumb, &self.config.table);

    if let Some(notification) = self.notifications.current() {
      render_toast(frame, body, notification);
    }
  }
}
