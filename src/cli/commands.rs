//! CLI command implementations

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::llm::{build_model, PromptKind};
use crate::output;
use crate::subtitles;
use crate::summarize::{summarize, SummarizeOptions};

/// Fetch a video's subtitles, summarize them, and write both documents.
pub async fn summarize_video(
    settings: &Settings,
    url: &str,
    prompt: &str,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let kind: PromptKind = prompt.parse()?;

    let title = subtitles::video_title(url).await?;
    let safe_title = output::sanitize_filename(&title);
    let dir = output_dir
        .unwrap_or_else(|| settings.general.output_dir.clone())
        .join(&safe_title);

    let transcript = subtitles::fetch_subtitles(url)
        .await?
        .with_context(|| format!("Failed to retrieve subtitles from video: {url}"))?;
    if transcript.trim().is_empty() {
        anyhow::bail!("Subtitles for {url} contained no spoken text");
    }

    let text_path = output::save_transcript(&dir, &transcript, &title, url)?;
    tracing::info!("Transcript saved to: {}", text_path.display());

    let model = build_model(settings)?;
    let summary = summarize(
        model.as_ref(),
        kind,
        &transcript,
        SummarizeOptions::from_settings(settings),
    )
    .await?;

    let summary_path = output::save_summary(&dir, &summary, &title, url)?;
    tracing::info!("Summary saved to: {}", summary_path.display());

    println!("{}{}", summary, output::video_footer(&title, url));

    Ok(())
}

/// Configuration management commands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}
