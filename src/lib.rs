//! vidsum - Turn YouTube video subtitles into AI-generated narrative summaries
//!
//! The core of the crate is a token-aware chunking and recursive map-reduce
//! summarization pipeline that handles transcripts larger than the language
//! model's input token budget.

pub mod cli;
pub mod config;
pub mod llm;
pub mod output;
pub mod subtitles;
pub mod summarize;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "vidsum";
