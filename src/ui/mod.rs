mod renderfns;
mod views;

use crate::app::{App, Pane};
use crate::status::{cached_note, Status};
use ratatui::prelude::*;
use ratatui::widgets::{ListState, Paragraph};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1),      // Header
      Constraint::Length(1),      // Status line
      Constraint::Percentage(45), // Bullish / bearish summaries
      Constraint::Min(3),         // All articles
      Constraint::Length(1),      // Footer
    ])
    .split(frame.area());

  let status = app.status();
  let focus = app.focus();
  let selected_url = app
    .selected_article()
    .and_then(|a| a.url.clone())
    .unwrap_or_default();
  let note = app
    .dashboard()
    .and_then(|d| cached_note(d.cached_at).or_else(|| Some(d.source.to_string())));

  renderfns::draw_header(
    frame,
    chunks[0],
    app.title(),
    app.query_term(),
    app.date(),
    note.as_deref(),
  );
  draw_status_line(frame, chunks[1], &status);

  let summaries = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(chunks[2]);

  let (dashboard, selections) = app.render_parts();
  let empty_text = placeholder(&status);

  views::summary::draw_summary(
    frame,
    summaries[0],
    views::summary::Bucket::Bullish,
    dashboard.map(|d| d.classified.bullish.as_slice()),
    &mut selections.bullish,
    focus == Pane::Bullish,
    empty_text,
  );
  views::summary::draw_summary(
    frame,
    summaries[1],
    views::summary::Bucket::Bearish,
    dashboard.map(|d| d.classified.bearish.as_slice()),
    &mut selections.bearish,
    focus == Pane::Bearish,
    empty_text,
  );
  views::articles::draw_articles(
    frame,
    chunks[3],
    dashboard,
    &mut selections.all,
    focus == Pane::All,
    empty_text,
  );

  renderfns::draw_footer(frame, chunks[4], &selected_url);
}

fn draw_status_line(frame: &mut Frame, area: Rect, status: &Status) {
  let style = match status {
    Status::Fetching => Style::default().fg(Color::Yellow),
    Status::NoResults => Style::default().fg(Color::DarkGray),
    Status::Loaded { .. } => Style::default().fg(Color::Green),
    Status::MissingConfiguration(_) | Status::Failed(_) => Style::default().fg(Color::Red),
  };
  let paragraph = Paragraph::new(format!(" {}", status.message())).style(style);
  frame.render_widget(paragraph, area);
}

/// Body text for panes with nothing to list
fn placeholder(status: &Status) -> &'static str {
  match status {
    Status::Fetching => "Loading...",
    Status::MissingConfiguration(_) => "Set an API key to fetch news.",
    Status::Failed(_) => "Error loading data. Press 'r' to retry.",
    Status::NoResults | Status::Loaded { .. } => "Nothing here.",
  }
}

/// Keep the selection inside the list after the data changed under it.
pub(crate) fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(7));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn test_placeholder_matches_status() {
    assert_eq!(placeholder(&Status::Fetching), "Loading...");
    assert!(placeholder(&Status::Failed("x".into())).contains("retry"));
  }
}
