use chrono::NaiveDate;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with title, query, day and where the data came from
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  query: &str,
  date: NaiveDate,
  source_note: Option<&str>,
) {
  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", query),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", date), Style::default().fg(Color::White)),
  ];

  if let Some(note) = source_note {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" {} ", note),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use ratatui::backend::TestBackend;

  #[test]
  fn test_header_shows_query_and_date() {
    let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
    terminal
      .draw(|frame| {
        draw_header(frame, frame.area(), "Coin Pulse", "bitcoin", date, Some("cache"));
      })
      .unwrap();

    let line: String = terminal
      .backend()
      .buffer()
      .content()
      .iter()
      .map(|cell| cell.symbol())
      .collect();
    assert!(line.contains("Coin Pulse"));
    assert!(line.contains("bitcoin"));
    assert!(line.contains("2024-03-14"));
    assert!(line.contains("cache"));
  }
}
