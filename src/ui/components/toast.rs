use crate::notify::{Level, Notification};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

const TOAST_WIDTH: u16 = 44;

fn level_color(level: Level) -> Color {
  match level {
    Level::Success => Color::Green,
    Level::Error => Color::Red,
  }
}

/// Draw a notification in the top-right corner of `area`
pub fn render_toast(frame: &mut Frame, area: Rect, notification: &Notification) {
  let width = TOAST_WIDTH.min(area.width);
  let inner_width = width.saturating_sub(2).max(1) as usize;
  let lines = notification.message.chars().count().div_ceil(inner_width).max(1) as u16;
  let height = (lines + 2).min(area.height);

  let toast_area = Rect::new(
    area.x + area.width.saturating_sub(width + 1),
    area.y + 1.min(area.height.saturating_sub(height)),
    width,
    height,
  );

  frame.render_widget(Clear, toast_area);

  let color = level_color(notification.level);
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(color))
    .title(Span::styled(
      format!(" {} ", notification.title),
      Style::default().fg(color).bold(),
    ));

  let paragraph = Paragraph::new(notification.message.as_str())
    .block(block)
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, toast_area);
}
