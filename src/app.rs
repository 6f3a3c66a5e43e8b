use crate::cache::{CacheStore, NoopStorage, SqliteStorage, DEFAULT_TTL_HOURS};
use crate::config::{CacheConfig, Config};
use crate::event::{Event, EventHandler};
use crate::news::transport::ReqwestTransport;
use crate::news::{Article, CachedNewsClient, NewsClient, NewsError};
use crate::query::{Query, QueryState};
use crate::status::{Dashboard, Status};
use crate::ui;
use chrono::{Duration, NaiveDate};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use std::io::stdout;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// The client the binary runs with: real HTTP, storage chosen at startup.
pub type NewsHandle = CachedNewsClient<ReqwestTransport, Box<dyn CacheStore>>;

/// Wire up the cached client from configuration.
///
/// Configuration problems come back as [`NewsError::ConfigurationMissing`].
/// A cache that can't be opened is not one of them: the app runs uncached.
pub fn build_client(
  config: &Config,
  query_override: Option<&str>,
  no_cache: bool,
) -> Result<NewsHandle, NewsError> {
  let mut news = NewsClient::new(&config.news, config.api_key())?;
  if let Some(query) = query_override.filter(|q| !q.trim().is_empty()) {
    news = news.with_query(query);
  }
  Ok(CachedNewsClient::new(news, open_storage(&config.cache, no_cache)))
}

fn open_storage(cache: &CacheConfig, no_cache: bool) -> Box<dyn CacheStore> {
  if no_cache || !cache.enabled {
    info!("Cache disabled");
    return Box::new(NoopStorage);
  }
  let opened = match &cache.path {
    Some(path) => SqliteStorage::open_at(path),
    None => SqliteStorage::open(),
  };
  match opened {
    Ok(storage) => Box::new(storage.with_ttl(cache_ttl(cache.ttl_hours))),
    Err(e) => {
      warn!(error = %e, "Cache unavailable, continuing without it");
      Box::new(NoopStorage)
    }
  }
}

/// `cache.ttl_hours` as a duration; out-of-range values fall back to the default.
fn cache_ttl(hours: i64) -> Duration {
  Duration::try_hours(hours).unwrap_or_else(|| {
    warn!(ttl_hours = hours, "cache.ttl_hours out of range, using {}", DEFAULT_TTL_HOURS);
    Duration::hours(DEFAULT_TTL_HOURS)
  })
}

/// Which list j/k moves in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
  #[default]
  Bullish,
  Bearish,
  All,
}

impl Pane {
  fn next(self) -> Self {
    match self {
      Pane::Bullish => Pane::Bearish,
      Pane::Bearish => Pane::All,
      Pane::All => Pane::Bullish,
    }
  }
}

/// Selection state for each list widget
#[derive(Debug, Default)]
pub struct Selections {
  pub bullish: ListState,
  pub bearish: ListState,
  pub all: ListState,
}

impl Selections {
  fn get_mut(&mut self, pane: Pane) -> &mut ListState {
    match pane {
      Pane::Bullish => &mut self.bullish,
      Pane::Bearish => &mut self.bearish,
      Pane::All => &mut self.all,
    }
  }
}

/// Main application state
pub struct App {
  config: Config,
  date: NaiveDate,
  query_term: String,

  /// Set when the client could not be built; nothing is fetched then
  setup_error: Option<String>,

  /// None exactly when `setup_error` is set
  query: Option<Query<Dashboard>>,

  /// Makes the next fetch bypass a fresh cache entry
  force_refresh: Arc<AtomicBool>,

  focus: Pane,
  selections: Selections,
  should_quit: bool,
}

impl App {
  pub fn new(
    config: Config,
    date: NaiveDate,
    client: Result<NewsHandle, NewsError>,
    refresh: bool,
  ) -> Self {
    let force_refresh = Arc::new(AtomicBool::new(refresh));

    let (query_term, setup_error, query) = match client {
      Ok(client) => {
        let term = client.query().to_string();
        let flag = Arc::clone(&force_refresh);
        let query = Query::new(move || {
          let client = client.clone();
          let bypass = flag.swap(false, Ordering::SeqCst);
          async move {
            let retrieved = if bypass {
              client.refresh(date).await
            } else {
              client.retrieve(date).await
            };
            retrieved
              .map(|r| Dashboard::from_retrieved(date, r))
              .map_err(|e| e.to_string())
          }
        });
        (term, None, Some(query))
      }
      Err(e) => {
        warn!(error = %e, "News client not configured");
        (config.news.query.clone(), Some(e.to_string()), None)
      }
    };

    Self {
      config,
      date,
      query_term,
      setup_error,
      query,
      force_refresh,
      focus: Pane::default(),
      selections: Selections::default(),
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    let mut events = EventHandler::new(std::time::Duration::from_millis(250));

    if let Some(query) = &mut self.query {
      query.fetch();
    }

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    // Abandon anything still in flight; the cache is only written on success
    if let Some(query) = &mut self.query {
      query.cancel();
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.tick(),
      Event::Resize => {}
    }
  }

  fn tick(&mut self) {
    let Some(query) = &mut self.query else {
      return;
    };
    if !query.poll() {
      return;
    }
    match query.state() {
      QueryState::Success(dashboard) => {
        info!(
          date = %dashboard.date,
          total = dashboard.classified.total,
          source = %dashboard.source,
          "Dashboard updated"
        );
        self.selections = Selections::default();
      }
      QueryState::Error(e) => warn!(error = %e, "Fetch failed"),
      _ => {}
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Tab => self.focus = self.focus.next(),
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      _ => {}
    }
  }

  fn refresh(&mut self) {
    if let Some(query) = &mut self.query {
      info!(date = %self.date, "Refreshing");
      self.force_refresh.store(true, Ordering::SeqCst);
      query.refetch();
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.pane_len(self.focus);
    step_selection(self.selections.get_mut(self.focus), len, delta);
  }

  fn pane_len(&self, pane: Pane) -> usize {
    self.dashboard().map_or(0, |d| match pane {
      Pane::Bullish => d.classified.bullish.len(),
      Pane::Bearish => d.classified.bearish.len(),
      Pane::All => d.articles.len(),
    })
  }

  // Accessors for UI rendering
  pub fn status(&self) -> Status {
    let state = self.query.as_ref().map(Query::state);
    Status::derive(self.setup_error.as_deref(), state.unwrap_or(&QueryState::Idle))
  }

  pub fn dashboard(&self) -> Option<&Dashboard> {
    self.query.as_ref().and_then(Query::data)
  }

  /// The dashboard and list states at once, for stateful list rendering.
  pub fn render_parts(&mut self) -> (Option<&Dashboard>, &mut Selections) {
    (
      self.query.as_ref().and_then(Query::data),
      &mut self.selections,
    )
  }

  pub fn focus(&self) -> Pane {
    self.focus
  }

  pub fn selected_article(&self) -> Option<&Article> {
    let dashboard = self.dashboard()?;
    let (state, pane) = match self.focus {
      Pane::Bullish => (&self.selections.bullish, &dashboard.classified.bullish),
      Pane::Bearish => (&self.selections.bearish, &dashboard.classified.bearish),
      Pane::All => {
        let idx = self.selections.all.selected()?;
        return dashboard.articles.get(idx);
      }
    };
    pane.get(state.selected()?).map(|s| &s.article)
  }

  pub fn title(&self) -> &str {
    self.config.header_title()
  }

  pub fn query_term(&self) -> &str {
    &self.query_term
  }

  pub fn date(&self) -> NaiveDate {
    self.date
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }
}

/// Move a list selection by `delta`, wrapping at both ends.
fn step_selection(state: &mut ListState, len: usize, delta: i32) {
  if len == 0 {
    state.select(None);
    return;
  }
  let current = state.selected().unwrap_or(0).min(len - 1);
  let next = (current as i64 + i64::from(delta)).rem_euclid(len as i64) as usize;
  state.select(Some(next));
}
