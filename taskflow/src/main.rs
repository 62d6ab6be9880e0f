//! `TaskFlow` — interactive task management shell.
//!
//! Reads one command per line from stdin and prints plain-text results.
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskflow/config.toml`).
//!
//! ```bash
//! # Sample tasks, session kept in the data directory
//! cargo run --bin taskflow
//!
//! # Nothing written to disk, no login latency
//! cargo run --bin taskflow -- --ephemeral --login-delay-ms 0
//!
//! # Scripted
//! printf 'login admin@taskflow.com password\ndashboard\n' | cargo run --bin taskflow
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;

use taskflow::clock::{SharedClock, SystemClock};
use taskflow::config::{AppConfig, CliArgs};
use taskflow::dashboard::Dashboard;
use taskflow::shell::{Flow, Shell};
use taskflow::storage::{FileStore, KeyValueStore, MemoryStore};

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            AppConfig::from_cli(&cli)
        }
    };

    // Logs go to a file; stdout belongs to the shell.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(
        data_dir = ?config.data_dir,
        ephemeral = config.ephemeral,
        seed = config.seed,
        "taskflow starting"
    );

    let slot = open_slot(&config);
    let clock: SharedClock = Arc::new(SystemClock);
    let dashboard = Dashboard::from_config(slot, clock, &config);
    let mut shell = Shell::new(dashboard, io::stdout());

    let result = run_shell(&mut shell).await;

    tracing::info!("taskflow exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskflow.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Picks the durable slot for the session snapshot.
fn open_slot(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    match (&config.data_dir, config.ephemeral) {
        (Some(dir), false) => {
            tracing::debug!(dir = %dir.display(), "session slot on disk");
            Arc::new(FileStore::new(dir))
        }
        _ => {
            tracing::debug!("session slot in memory");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Reads stdin line by line until EOF or `quit`.
async fn run_shell<W: io::Write>(shell: &mut Shell<Arc<dyn KeyValueStore>, W>) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    shell.prompt()?;
    while let Some(line) = lines.next_line().await? {
        if shell.execute_line(&line).await? == Flow::Quit {
            return Ok(());
        }
        shell.prompt()?;
    }
    Ok(())
}
