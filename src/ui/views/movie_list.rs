use crate::cache::CacheState;
use crate::movies::form::format_price;
use crate::movies::{CachedMovieClient, Movie};
use crate::query::{Mutation, Query, QueryState};
use crate::ui::components::{ConfirmDialog, ConfirmEvent, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{availability_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::MovieFormView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

const DELETE_MESSAGE: &str = "Are you sure? This will permanently delete the movie.";

/// Root view: the movie inventory as a list of cards
pub struct MovieListView {
  client: CachedMovieClient,
  query: Query<Vec<Movie>>,
  list_state: ListState,
  confirm: ConfirmDialog,
  delete: Mutation<()>,
  /// Movie the open confirm dialog refers to
  delete_target: Option<String>,
}

impl MovieListView {
  pub fn new(client: CachedMovieClient) -> Self {
    let client_for_query = client.clone();
    let mut query = Query::new(move || {
      let client = client_for_query.clone();
      async move { client.list_movies().await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.fetch();

    Self {
      client,
      query,
      list_state: ListState::default(),
      confirm: ConfirmDialog::new(),
      delete: Mutation::new(),
      delete_target: None,
    }
  }

  fn movies(&self) -> &[Movie] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn selected_movie(&self) -> Option<&Movie> {
    self.list_state.selected().and_then(|i| self.movies().get(i))
  }

  fn refresh(&mut self) {
    self.client.refresh();
    self.query.refetch();
  }

  fn start_delete(&mut self) {
    let Some(id) = self.delete_target.take() else {
      return;
    };
    let client = self.client.clone();
    self
      .delete
      .mutate(async move { client.delete_movie(&id).await.map_err(|e| e.to_string()) });
  }

  fn title(&self) -> String {
    let count = self.movies().len();
    if self.delete.is_pending() {
      format!(" Movies ({}) (deleting...) ", count)
    } else if self.query.is_loading() && self.query.data().is_some() {
      format!(" Movies ({}) (refreshing...) ", count)
    } else {
      format!(" Movies ({}) ", count)
    }
  }

  fn card(movie: &Movie, selected: bool, width: usize) -> ListItem<'static> {
    let status_style = Style::default().fg(availability_color(&movie.availability_status));

    let mut lines = vec![
      Line::from(vec![
        Span::styled(
          truncate(&movie.title, width.saturating_sub(16).max(8)),
          Style::default().fg(Color::White).bold(),
        ),
        Span::raw("  "),
        Span::styled(format!("[{}]", movie.availability_status), status_style),
      ]),
      Line::from(vec![
        Span::styled(movie.genre.clone(), Style::default().fg(Color::Cyan)),
        Span::styled(" • ", Style::default().fg(Color::DarkGray)),
        Span::raw(movie.release_year.to_string()),
        Span::styled(" • ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          format!("${}", format_price(movie.rental_price)),
          Style::default().fg(Color::Green),
        ),
      ]),
    ];

    if selected {
      let description = match movie.description.as_deref() {
        Some(d) if !d.trim().is_empty() => truncate(d.trim(), width.max(8)),
        _ => "No description".to_string(),
      };
      lines.push(Line::styled(
        description,
        Style::default().fg(Color::Gray).italic(),
      ));
    }
    lines.push(Line::raw(""));

    ListItem::new(lines)
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.movies().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.query.data().is_none() {
      let (content, color) = match self.query.state() {
        QueryState::Error(e) => (
          format!("Error loading movies: {}\n\nPress 'r' to retry.", e),
          Color::Red,
        ),
        _ => ("Loading movies...".to_string(), Color::DarkGray),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    }

    if len == 0 {
      let paragraph = Paragraph::new("No movies found. Press 'a' to add your first movie.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let selected = self.list_state.selected();
    let items: Vec<ListItem> = self
      .movies()
      .iter()
      .enumerate()
      .map(|(i, movie)| Self::card(movie, selected == Some(i), width))
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);

    // A failed refresh keeps the old cards on screen
    if let Some(error) = self.query.error() {
      let bottom = Rect::new(area.x + 1, area.bottom().saturating_sub(1), area.width.saturating_sub(2), 1);
      frame.render_widget(
        Paragraph::new(format!(" Error loading movies: {} ", error)).style(Style::default().fg(Color::Red)),
        bottom,
      );
    }
  }
}

impl View for MovieListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed) => {
        self.start_delete();
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) => {
        self.delete_target = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('a') => {
        return ViewAction::Push(Box::new(MovieFormView::create(self.client.clone())));
      }
      KeyCode::Char('e') | KeyCode::Enter => {
        if let Some(movie) = self.selected_movie() {
          return ViewAction::Push(Box::new(MovieFormView::edit(
            self.client.clone(),
            movie.clone(),
          )));
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        if self.delete.is_pending() {
          return ViewAction::None;
        }
        let target = self
          .selected_movie()
          .map(|m| (m.id.clone(), format!("Delete \"{}\"", truncate(&m.title, 30))));
        if let Some((id, title)) = target {
          self.delete_target = Some(id);
          self.confirm.show(title, DELETE_MESSAGE);
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Movies".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    self.delete.poll();

    // A write elsewhere invalidated the list. After a failed fetch wait for
    // 'r' instead of retrying every tick.
    if self.client.list_state() == CacheState::Stale && !self.query.is_loading() && !self.query.is_error() {
      self.query.refetch();
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.confirm.is_active() {
      return vec![
        ShortcutInfo::new("y", "delete").with_priority(10),
        ShortcutInfo::new("n/Esc", "keep").with_priority(20),
      ];
    }
    vec![
      ShortcutInfo::new("a", "add").with_priority(10),
      ShortcutInfo::new("e", "edit").with_priority(20),
      ShortcutInfo::new("d", "delete").with_priority(30),
      ShortcutInfo::new("r", "refresh").with_priority(40),
      ShortcutInfo::new("j/k", "move").with_priority(50),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
