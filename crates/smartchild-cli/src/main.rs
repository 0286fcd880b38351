//! SmartChild CLI - medical records for the signed-in child, from the
//! records service when it is reachable and from the local cache when not.

mod render;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smartchild_core::{Config, RecordSource, RecordsRepository};

#[derive(Parser, Debug)]
#[command(name = "smartchild")]
#[command(about = "Medical records for SmartChild, online or offline")]
#[command(version)]
struct Args {
    /// Path to config file (default: ~/.config/smartchild/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List medical records, newest first
    List {
        /// Child id (default: the signed-in child)
        #[arg(long)]
        child: Option<i64>,
    },
    /// Show a single medical record
    Show {
        /// Record id
        id: i64,
        /// Child id whose cached records to search (default: the signed-in child)
        #[arg(long)]
        child: Option<i64>,
    },
    /// Show what is cached for a child
    Cache {
        #[arg(long)]
        child: Option<i64>,
    },
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the log file on drop.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "smartchild.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let _guard = init_tracing(args.log_file.as_deref());

    let config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!(api = %config.api_base_url(), "SmartChild starting");

    let repo = RecordsRepository::from_config(&config)?;
    let profile = repo.profile().await;
    let signed_in = profile.as_ref().and_then(|p| p.child_id());
    let today = Local::now().date_naive();

    match args.command {
        Command::List { child } => {
            let child_id = child.or(signed_in);
            let outcome = repo.load_records_for(child_id).await;
            println!("{}", render::render_header(profile.as_ref(), child_id));
            println!();
            print!("{}", render::render_list(&outcome.records, outcome.source, today));
        }
        Command::Show { id, child } => {
            debug!(record_id = id, tiers = ?repo.resolver().tier_names(), "Opening record");
            let resolved = repo.open_record_for(child.or(signed_in), id).await;
            info!(record_id = id, tier = resolved.tier, "Showing record");
            print!("{}", render::render_detail(&resolved.record));
        }
        Command::Cache { child } => {
            let child_id = child.or(signed_in);
            match repo.cached_records(child_id).await {
                Some(cached) => {
                    println!(
                        "{} cached records, updated {}",
                        cached.data.len(),
                        cached.age_display()
                    );
                    print!("{}", render::render_list(&cached.data, RecordSource::Remote, today));
                }
                None => println!("Nothing cached yet"),
            }
        }
    }

    Ok(())
}
