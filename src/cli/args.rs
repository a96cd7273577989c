//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// vidsum - AI-powered summaries of YouTube videos from their subtitles
#[derive(Parser, Debug)]
#[command(name = "vidsum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a YouTube video from its subtitles
    Summarize {
        /// URL of the YouTube video to summarize
        url: String,

        /// Directory to write the transcript and summary into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Prompt type to use (summary)
        #[arg(short, long, default_value = "summary")]
        prompt: String,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
