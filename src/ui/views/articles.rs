use crate::sentiment::score;
use crate::status::Dashboard;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{sentiment_color, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Draw every fetched article, neutral ones included, newest first as served
pub fn draw_articles(
  frame: &mut Frame,
  area: Rect,
  dashboard: Option<&Dashboard>,
  state: &mut ListState,
  focused: bool,
  empty_text: &str,
) {
  let articles = dashboard.map(|d| d.articles.as_slice()).unwrap_or_default();
  ensure_valid_selection(state, articles.len());

  let title = match dashboard {
    Some(d) => format!(
      " All Articles ({}, {} neutral) ",
      d.classified.total, d.classified.neutral
    ),
    None => " All Articles ".to_string(),
  };
  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused { Color::Blue } else { Color::DarkGray }));

  if articles.is_empty() {
    let paragraph = Paragraph::new(empty_text)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let width = area.width.saturating_sub(30) as usize;
  let items: Vec<ListItem> = articles
    .iter()
    .map(|article| {
      let published = article
        .published_at
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());
      let outlet = article.source.as_deref().unwrap_or("");
      let color = sentiment_color(score(&article.sentiment_text()).score);

      ListItem::new(Line::from(vec![
        Span::styled(format!("{} ", published), Style::default().fg(Color::DarkGray)),
        Span::styled(
          format!("{:<16} ", truncate(outlet, 16)),
          Style::default().fg(Color::Cyan),
        ),
        Span::styled(truncate(article.display_title(), width), Style::default().fg(color)),
      ]))
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  frame.render_stateful_widget(list, area, state);
}
