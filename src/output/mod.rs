//! Output document writing and filename sanitization.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Characters not allowed in Windows, macOS or Linux filenames.
fn forbidden_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("valid filename regex"))
}

/// Sanitize a proposed filename into a filesystem-safe one.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized = forbidden_pattern().replace_all(name, "");
    let sanitized = sanitized.trim_matches(|c| c == ' ' || c == '.');
    sanitized.chars().take(255).collect()
}

/// Markdown footer linking a document back to its source video.
pub fn video_footer(title: &str, url: &str) -> String {
    format!("\n\nOriginal video: [**{title}**]({url})\n")
}

/// Write the cleaned transcript to `<dir>/text.md`.
pub fn save_transcript(dir: &Path, transcript: &str, title: &str, url: &str) -> Result<PathBuf> {
    write_document(dir, "text.md", transcript, title, url)
}

/// Write the final summary to `<dir>/summary.md`.
pub fn save_summary(dir: &Path, summary: &str, title: &str, url: &str) -> Result<PathBuf> {
    write_document(dir, "summary.md", summary, title, url)
}

fn write_document(dir: &Path, file: &str, body: &str, title: &str, url: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(file);
    let content = format!("{}{}", body, video_footer(title, url));
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
