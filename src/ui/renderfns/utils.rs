use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for a sentiment score
pub fn sentiment_color(score: i64) -> Color {
  match score {
    s if s > 0 => Color::Green,
    s if s < 0 => Color::Red,
    _ => Color::Gray,
  }
}
