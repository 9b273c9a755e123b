use crate::movies::form::{current_year, Field, FieldError, MovieDraft};
use crate::movies::{CachedMovieClient, Movie};
use crate::query::{Mutation, MutationState};
use crate::ui::components::{KeyResult, TextInput};
use crate::ui::renderfns::availability_color;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

const LABEL_WIDTH: u16 = 24;

/// Add or edit a single movie
pub struct MovieFormView {
  client: CachedMovieClient,
  /// The movie being edited; `None` when adding
  editing: Option<Movie>,
  draft: MovieDraft,
  focus: usize,
  /// Editor for the focused text field, mirrored into `draft` on every change
  editor: TextInput,
  errors: Vec<FieldError>,
  save: Mutation<()>,
}

impl MovieFormView {
  pub fn create(client: CachedMovieClient) -> Self {
    Self::with_draft(client, None, MovieDraft::new(current_year()))
  }

  pub fn edit(client: CachedMovieClient, movie: Movie) -> Self {
    let draft = MovieDraft::from_movie(&movie);
    Self::with_draft(client, Some(movie), draft)
  }

  fn with_draft(client: CachedMovieClient, editing: Option<Movie>, draft: MovieDraft) -> Self {
    let mut view = Self {
      client,
      editing,
      draft,
      focus: 0,
      editor: TextInput::new(),
      errors: Vec::new(),
      save: Mutation::new(),
    };
    view.set_focus(0);
    view
  }

  fn focused(&self) -> Field {
    Field::ALL[self.focus]
  }

  fn set_focus(&mut self, index: usize) {
    self.focus = index % Field::ALL.len();
    self.editor = text_value(&self.draft, self.focused())
      .map(TextInput::with_value)
      .unwrap_or_default();
  }

  fn move_focus(&mut self, forward: bool) {
    let len = Field::ALL.len();
    let next = if forward {
      self.focus + 1
    } else {
      self.focus + len - 1
    };
    self.set_focus(next);
  }

  fn clear_error(&mut self, field: Field) {
    self.errors.retain(|e| e.field != field);
  }

  fn submit(&mut self) {
    let valid = match self.draft.validate(current_year()) {
      Ok(valid) => valid,
      Err(errors) => {
        self.errors = errors;
        return;
      }
    };
    self.errors.clear();

    let client = self.client.clone();
    match &self.editing {
      Some(movie) => {
        let id = movie.id.clone();
        let changes = valid.into_changes();
        self.save.mutate(async move {
          client
            .update_movie(&id, changes)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
        });
      }
      None => {
        let movie = valid.into_new_movie();
        self.save.mutate(async move {
          client
            .create_movie(movie)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
        });
      }
    }
  }

  fn field_value(&self, field: Field) -> Span<'_> {
    match field {
      Field::Genre if self.draft.genre.is_empty() => {
        Span::styled("< select a genre >", Style::default().fg(Color::DarkGray))
      }
      Field::Genre => Span::styled(
        format!("< {} >", self.draft.genre),
        Style::default().fg(Color::Cyan),
      ),
      Field::Availability => Span::styled(
        format!("< {} >", self.draft.availability_status),
        Style::default().fg(availability_color(&self.draft.availability_status)),
      ),
      _ if field == self.focused() => Span::raw(self.editor.value()),
      _ => Span::raw(text_value(&self.draft, field).unwrap_or_default()),
    }
  }

  fn submit_label(&self) -> Span<'static> {
    if self.save.is_pending() {
      return Span::styled("[ Saving... ]", Style::default().fg(Color::Yellow));
    }
    let label = if self.editing.is_some() {
      "[ Update Movie ]"
    } else {
      "[ Add Movie ]"
    };
    Span::styled(label, Style::default().fg(Color::Green).bold())
  }
}

/// Text behind a free-form field; `None` for the cycled ones
fn text_value(draft: &MovieDraft, field: Field) -> Option<&str> {
  match field {
    Field::Title => Some(&draft.title),
    Field::Description => Some(&draft.description),
    Field::ReleaseYear => Some(&draft.release_year),
    Field::RentalPrice => Some(&draft.rental_price),
    Field::Genre | Field::Availability => None,
  }
}

fn text_value_mut(draft: &mut MovieDraft, field: Field) -> Option<&mut String> {
  match field {
    Field::Title => Some(&mut draft.title),
    Field::Description => Some(&mut draft.description),
    Field::ReleaseYear => Some(&mut draft.release_year),
    Field::RentalPrice => Some(&mut draft.rental_price),
    Field::Genre | Field::Availability => None,
  }
}

impl View for MovieFormView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.save.is_pending() {
      return ViewAction::None;
    }

    let field = self.focused();
    let last = self.focus + 1 == Field::ALL.len();

    match key.code {
      KeyCode::Esc => return ViewAction::Pop,
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit(),
      KeyCode::Enter if last => self.submit(),
      KeyCode::Tab | KeyCode::Down | KeyCode::Enter => self.move_focus(true),
      KeyCode::BackTab | KeyCode::Up => self.move_focus(false),
      KeyCode::Left | KeyCode::Right if field == Field::Genre => {
        self.draft.cycle_genre(key.code == KeyCode::Right);
        self.clear_error(field);
      }
      KeyCode::Left | KeyCode::Right if field == Field::Availability => {
        self.draft.cycle_availability(key.code == KeyCode::Right);
        self.clear_error(field);
      }
      _ => {
        if let Some(text) = text_value_mut(&mut self.draft, field) {
          if let KeyResult::Event(value) = self.editor.handle_key(key) {
            *text = value;
            self.clear_error(field);
          }
        }
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.editing.is_some() {
      " Edit Movie "
    } else {
      " Add New Movie "
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    let mut cursor = None;

    for (i, field) in Field::ALL.iter().copied().enumerate() {
      let focused = i == self.focus;
      let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::White)
      };
      let marker = if focused { "> " } else { "  " };

      if focused && text_value(&self.draft, field).is_some() {
        cursor = Some(lines.len() as u16);
      }
      lines.push(Line::from(vec![
        Span::styled(
          format!("{}{:<width$}", marker, field.label(), width = LABEL_WIDTH as usize - 2),
          label_style,
        ),
        self.field_value(field),
      ]));

      for error in self.errors.iter().filter(|e| e.field == field) {
        lines.push(Line::styled(
          format!("{:width$}{}", "", error.message, width = LABEL_WIDTH as usize),
          Style::default().fg(Color::Red),
        ));
      }
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
      Span::raw(" ".repeat(LABEL_WIDTH as usize)),
      self.submit_label(),
    ]));
    if let MutationState::Error(_) = self.save.state() {
      lines.push(Line::styled(
        format!("{:width$}Not saved, fix and try again.", "", width = LABEL_WIDTH as usize),
        Style::default().fg(Color::Red),
      ));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
      " Tab/↑/↓ move   ←/→ choose   Enter on last field or Ctrl-S save   Esc cancel",
      Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);

    if let Some(row) = cursor {
      let x = inner.x + LABEL_WIDTH + self.editor.cursor_position() as u16;
      frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y + row));
    }
  }

  fn breadcrumb_label(&self) -> String {
    match &self.editing {
      Some(movie) => format!("Edit: {}", movie.title),
      None => "Add Movie".to_string(),
    }
  }

  fn tick(&mut self) -> ViewAction {
    // Failures stay open with the draft intact; the toast carries the reason
    if self.save.poll() && matches!(self.save.state(), MutationState::Success(())) {
      return ViewAction::Pop;
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "next field").with_priority(10),
      ShortcutInfo::new("←/→", "choose").with_priority(20),
      ShortcutInfo::new("Ctrl-S", "save").with_priority(30),
      ShortcutInfo::new("Esc", "cancel").with_priority(90),
    ]
  }
}
