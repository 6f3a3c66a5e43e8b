use crate::sentiment::Scored;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{sentiment_color, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
  Bullish,
  Bearish,
}

impl Bucket {
  fn label(self) -> &'static str {
    match self {
      Bucket::Bullish => "Bullish",
      Bucket::Bearish => "Bearish",
    }
  }

  fn color(self) -> Color {
    match self {
      Bucket::Bullish => Color::Green,
      Bucket::Bearish => Color::Red,
    }
  }
}

/// Pane title, e.g. " Bullish Articles (3 articles) "
pub fn summary_title(bucket: Bucket, count: Option<usize>) -> String {
  match count {
    Some(n) => format!(" {} Articles ({} articles) ", bucket.label(), n),
    None => format!(" {} Articles ", bucket.label()),
  }
}

/// Draw one sentiment bucket as "title: description" rows
pub fn draw_summary(
  frame: &mut Frame,
  area: Rect,
  bucket: Bucket,
  articles: Option<&[Scored]>,
  state: &mut ListState,
  focused: bool,
  empty_text: &str,
) {
  let border = if focused { bucket.color() } else { Color::DarkGray };
  let block = Block::default()
    .title(summary_title(bucket, articles.map(<[Scored]>::len)))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let articles = articles.unwrap_or_default();
  ensure_valid_selection(state, articles.len());

  if articles.is_empty() {
    let paragraph = Paragraph::new(empty_text)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let width = area.width.saturating_sub(8) as usize;
  let items: Vec<ListItem> = articles
    .iter()
    .map(|scored| {
      let title = scored.article.display_title();
      let rest = width.saturating_sub(title.chars().count() + 2);
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{:+} ", scored.sentiment.score),
          Style::default().fg(sentiment_color(scored.sentiment.score)),
        ),
        Span::styled(truncate(title, width), Style::default().bold()),
        Span::styled(
          format!(": {}", truncate(scored.article.display_description(), rest)),
          Style::default().fg(Color::Gray),
        ),
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
