use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const HINTS: [(&str, &str); 4] = [
  ("<tab>", "pane"),
  ("<j/k>", "move"),
  ("<r>", "refresh"),
  ("<q>", "quit"),
];

/// Draw the footer bar with key hints and the selected article's link
pub fn draw_footer(frame: &mut Frame, area: Rect, selected_url: &str) {
  let mut spans = vec![Span::raw(" ")];

  for (key, label) in HINTS {
    spans.push(Span::styled(key, Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
      format!(" {}   ", label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  if !selected_url.is_empty() {
    spans.push(Span::styled(selected_url, Style::default().fg(Color::Blue).underlined()));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}
