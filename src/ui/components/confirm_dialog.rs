use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by the confirm dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
  Confirmed,
  Cancelled,
}

/// Yes/no dialog shown over the current view
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
  active: bool,
  title: String,
  message: String,
}

impl ConfirmDialog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn show(&mut self, title: impl Into<String>, message: impl Into<String>) {
    self.active = true;
    self.title = title.into();
    self.message = message.into();
  }

  pub fn hide(&mut self) {
    self.active = false;
  }

  /// While open the dialog swallows every key.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
        self.hide();
        KeyResult::Event(ConfirmEvent::Confirmed)
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') | KeyCode::Esc => {
        self.hide();
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the dialog overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = 50.min(area.width.saturating_sub(4)).max(20);
    let height = 6.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width.min(area.width), height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(format!(" {} ", self.title));

    let text = vec![
      Line::from(self.message.as_str()),
      Line::from(""),
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Cyan)),
        Span::styled(" delete   ", Style::default().fg(Color::DarkGray)),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
      ]),
    ];

    let paragraph = Paragraph::new(text)
      .block(block)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}
