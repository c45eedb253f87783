use std::path::PathBuf;

mod view;

use crate::view::ResultDisplay;
use crate::view::std_out::StdoutDisplayBuilder;
use crate::view::tui::{LogBuffer, TuiDisplayBuilder};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wsf::{ScheduleApi, Session};
use wsf::config::WsfConfig;

#[derive(Parser, Debug)]
#[command(name = "wsf", version, about = "Washington State Ferry schedules")]
struct Cli {
    /// Prefix of the departing terminal, e.g. `sea` for Seattle
    from: String,

    /// Prefix of the arriving terminal, e.g. `ba` for Bainbridge Island
    to: String,

    /// Show all times for today, not just remaining ones
    #[arg(short, long)]
    all: bool,

    /// Use a simple TUI for display
    #[arg(long)]
    tui: bool,

    /// Schedule API access token
    #[arg(long, env = "WSF_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// YAML config file, defaults to <config dir>/wsf/config.yaml
    #[arg(long)]
    config: Option<PathBuf>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("WSF_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
}

/// In TUI mode logs go to a buffer shown below the schedule, otherwise to stderr.
fn init_logging(tui: bool) -> anyhow::Result<Option<LogBuffer>> {
    if tui {
        let log_buffer = LogBuffer::new(8);
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(log_buffer.clone())
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(Some(log_buffer))
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let log_buffer = init_logging(args.tui)?;

    let config = WsfConfig::load_or_default(args.config.as_deref())?;
    let api = config.api_client(config.access_token(args.token)?)?;
    let cache_path = config.cache_path()?;

    info!("Using cache at {}", cache_path.display());

    let mut session = Session::open(api, cache_path).await;

    let today = Local::now().date_naive();
    let from = session.find_terminal(today, &args.from).await?;
    let to = session.find_terminal(today, &args.to).await?;
    let sailings = session
        .schedule(today, from.terminal_id, to.terminal_id)
        .await?;

    let display: Box<dyn ResultDisplay> = match log_buffer {
        Some(log_buffer) => Box::new(
            TuiDisplayBuilder::default()
                .show_all(args.all)
                .log_buffer(log_buffer)
                .build()?,
        ),
        None => Box::new(StdoutDisplayBuilder::default().show_all(args.all).build()?),
    };

    display.display(&sailings)?;

    save_cache(&session);
    Ok(())
}

/// A cache that can't be written only costs the next run a refetch.
fn save_cache<A: ScheduleApi>(session: &Session<A>) -> bool {
    match session.save() {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not save cache: {e}");
            false
        }
    }
}
