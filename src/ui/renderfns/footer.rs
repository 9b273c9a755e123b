use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar: view breadcrumb on the left, table name on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], table: &str) {
  let last = breadcrumb.len().saturating_sub(1);
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }
    let style = if i == last {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::styled(part.as_str(), style));
  }

  let table_line = Line::from(vec![
    Span::styled("table: ", Style::default().fg(Color::DarkGray)),
    Span::styled(table, Style::default().fg(Color::White)),
    Span::raw(" "),
  ]);
  // Display width, not bytes, and never past u16
  let table_width = u16::try_from(table_line.width())
    .unwrap_or(u16::MAX)
    .saturating_add(1);

  let [left, right] = Layout::horizontal([Constraint::Min(1), Constraint::Length(table_width)])
    .areas(area);

  let style = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(Line::from(spans)).style(style), left);
  frame.render_widget(
    Paragraph::new(table_line)
      .style(style)
      .alignment(Alignment::Right),
    right,
  );
}
