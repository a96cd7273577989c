//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// LLM settings
    #[serde(default)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Directory where transcripts and summaries are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (gemini)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key (for cloud providers)
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API endpoint (for custom/proxy deployments)
    #[serde(default)]
    pub endpoint: String,

    /// Maximum tokens a single prompt may contain
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,

    /// Attempts per model call before quota exhaustion becomes fatal
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds to wait between quota-exhausted attempts
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Maximum simultaneous in-flight chunk calls
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

// Default value functions

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vidsum", "vidsum")
}

fn default_output_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("Output"))
        .unwrap_or_else(|| PathBuf::from("~/.local/share/vidsum/Output"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_input_tokens() -> usize {
    6000
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            model: default_llm_model(),
            endpoint: String::new(),
            max_input_tokens: default_max_input_tokens(),
            max_retries: default_max_retries(),
            backoff_secs: default_backoff_secs(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if self.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("VIDSUM_GEMINI_API_KEY") {
                if !key.trim().is_empty() {
                    self.llm.api_key = key;
                }
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = project_dirs().context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Directory for daily log files
    pub fn log_dir() -> Result<PathBuf> {
        let dirs = project_dirs().context("Could not determine log directory")?;
        Ok(dirs.data_dir().join("logs"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
