//! Subtitle retrieval via yt-dlp.
//!
//! Shells out to `yt-dlp` to download English subtitles (official first,
//! auto-generated as a fallback) into a temporary directory, then cleans the
//! SRT content down to plain spoken text.

pub mod srt;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::process::Command;

/// Download English subtitles for a video and return them as clean text.
///
/// Returns `Ok(None)` when the video has no English subtitles at all; a
/// missing `yt-dlp` binary is an error.
pub async fn fetch_subtitles(url: &str) -> Result<Option<String>> {
    tracing::info!("Starting subtitle download for URL: {url}");

    let tmpdir = tempfile::tempdir().context("Failed to create temporary subtitle directory")?;
    let base = tmpdir.path().join("subs");

    tracing::debug!("Attempting to download official English subtitles...");
    run_subtitle_download(url, &base, false).await?;
    let mut srt_file = find_srt_file(tmpdir.path())?;

    if srt_file.is_none() {
        tracing::debug!("Official subtitles not found. Trying auto-generated subtitles...");
        run_subtitle_download(url, &base, true).await?;
        srt_file = find_srt_file(tmpdir.path())?;
    }

    let Some(path) = srt_file else {
        tracing::info!("No subtitles found.");
        return Ok(None);
    };

    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
    tracing::debug!(
        "Read subtitles from {} ({} characters)",
        path.display(),
        content.len()
    );

    Ok(Some(srt::raw_text(&content)))
}

/// Fetch the video title without downloading any content.
pub async fn video_title(url: &str) -> Result<String> {
    tracing::debug!("Fetching video title for URL: {url}");

    let output = Command::new("yt-dlp")
        .args([
            "--quiet",
            "--no-warnings",
            "--skip-download",
            "--dump-single-json",
            url,
        ])
        .output()
        .await
        .context("Failed to run yt-dlp. Is it installed and on PATH?")?;

    if !output.status.success() {
        anyhow::bail!(
            "Could not extract video info for URL {url}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)
        .with_context(|| format!("Failed to parse yt-dlp metadata for URL: {url}"))?;

    let title = metadata
        .get("title")
        .and_then(|t| t.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .with_context(|| format!("No title found in video metadata for URL: {url}"))?
        .to_string();

    tracing::info!("Retrieved video title: {title}");
    Ok(title)
}

async fn run_subtitle_download(url: &str, base: &Path, auto_generated: bool) -> Result<()> {
    let mut cmd = Command::new("yt-dlp");
    cmd.args(["--quiet", "--no-warnings", "--skip-download", "--write-subs"])
        .args(["--sub-langs", "en.*"])
        .args(["--convert-subs", "srt"])
        .arg("--output")
        .arg(format!("{}.%(ext)s", base.display()));
    if auto_generated {
        cmd.arg("--write-auto-subs");
    }
    cmd.arg(url);

    let status = cmd
        .status()
        .await
        .context("Failed to run yt-dlp. Is it installed and on PATH?")?;

    // A failed download is treated as "no subtitles", not a hard error.
    if !status.success() {
        tracing::warn!("yt-dlp exited with {status} while downloading subtitles for {url}");
    }

    Ok(())
}

/// Locate a downloaded `subs.en*.srt` file, matching any English variant
/// (en, en-GB, en-US, ...).
fn find_srt_file(dir: &Path) -> Result<Option<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list subtitle directory: {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("subs.en") && name.ends_with(".srt") {
            tracing::debug!("Found subtitle file: {name}");
            return Ok(Some(entry.path()));
        }
    }

    Ok(None)
}
