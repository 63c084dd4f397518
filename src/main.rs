mod cli;
mod config;
mod dashboard;
mod model;
mod orchestrator;
mod store;
mod styling;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Log to stderr, or to a file while the TUI owns the terminal.
fn init_logging(interactive: bool, settings: &config::Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if interactive && cfg!(feature = "tui") {
        let Some(path) = settings.log_file.clone().or_else(config::default_log_path) else {
            // Nowhere to write; stay quiet rather than draw over the UI.
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create log directory {}", dir.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let settings = cli::build_settings(&args)?;
    init_logging(args.is_interactive(), &settings)?;

    tracing::debug!(backend = ?settings.backend, "starting");
    cli::run(args, settings).await
}
