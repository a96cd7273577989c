//! vidsum - AI-powered summaries of YouTube videos from their subtitles
//!
//! Entry point for the vidsum CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidsum::cli::{Cli, Commands};
use vidsum::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging: user-facing messages on stderr, full detail in a
    // daily log file.
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Completions { shell } => {
            vidsum::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            match command {
                Commands::Summarize {
                    url,
                    output_dir,
                    prompt,
                } => {
                    vidsum::cli::commands::summarize_video(&settings, &url, &prompt, output_dir)
                        .await?;
                }
                Commands::Config(config_cmd) => {
                    vidsum::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}

/// Set up the stderr and daily-file tracing subscribers.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let log_dir = Settings::log_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let log_path = log_dir.join(format!("{}.log", chrono::Local::now().format("%Y-%m-%d")));
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(std::sync::Arc::new(log_file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
