mod app;
mod cache;
mod config;
mod event;
mod news;
mod query;
mod report;
mod sentiment;
mod status;
mod ui;

use chrono::{Local, NaiveDate};
use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "coinpulse")]
#[command(about = "Sort a day's crypto headlines into bullish and bearish piles")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./coinpulse.yaml, then $XDG_CONFIG_HOME/coinpulse/config.yaml)
  #[arg(short, long, env = "COINPULSE_CONFIG")]
  config: Option<PathBuf>,

  /// Day to fetch news from, YYYY-MM-DD (default: yesterday)
  #[arg(short, long)]
  date: Option<NaiveDate>,

  /// Search term, overriding news.query from the config
  #[arg(short, long)]
  query: Option<String>,

  /// Print the summaries to stdout instead of starting the TUI
  #[arg(short, long)]
  print: bool,

  /// Ignore a fresh cache entry for the day and fetch again
  #[arg(long)]
  refresh: bool,

  /// Neither read nor write the local cache
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = init_tracing(args.print)?;

  let config = config::Config::load(args.config.as_deref())?;
  let date = args.date.unwrap_or_else(yesterday);

  if args.print {
    return print_report(&config, &args, date).await;
  }

  let client = app::build_client(&config, args.query.as_deref(), args.no_cache);
  let mut app = app::App::new(config, date, client, args.refresh);
  app.run().await?;

  Ok(())
}

async fn print_report(config: &config::Config, args: &Args, date: NaiveDate) -> Result<()> {
  let client = app::build_client(config, args.query.as_deref(), args.no_cache)?;
  let retrieved = if args.refresh {
    client.refresh(date).await?
  } else {
    client.retrieve(date).await?
  };
  let dashboard = status::Dashboard::from_retrieved(date, retrieved);
  print!("{}", report::render(client.query(), &dashboard));
  Ok(())
}

/// Log to stderr in print mode. The TUI owns the terminal, so there logs go
/// to a daily file under the data directory.
fn init_tracing(print_mode: bool) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  if print_mode {
    tracing_subscriber::registry()
      .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
      .with(filter)
      .init();
    return Ok(None);
  }

  let log_dir = dirs::data_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("coinpulse");
  std::fs::create_dir_all(&log_dir)?;
  let (writer, guard) =
    tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "coinpulse.log"));

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .with(filter)
    .init();
  Ok(Some(guard))
}

/// The previous local day; a full day of headlines is available for it.
fn yesterday() -> NaiveDate {
  let today = Local::now().date_naive();
  today.pred_opt().unwrap_or(today)
}
