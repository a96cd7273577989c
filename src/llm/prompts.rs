//! Prompt templates keyed by a closed prompt-type enum.

use std::str::FromStr;

use thiserror::Error;

/// A pure function that embeds input text into an instruction template.
pub type PromptFn = fn(&str) -> String;

/// Supported prompt types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Rewrite a transcription into a coherent narrative summary.
    Summary,
}

impl PromptKind {
    /// The rendering function associated with this prompt type.
    pub fn renderer(self) -> PromptFn {
        match self {
            PromptKind::Summary => summary_prompt,
        }
    }
}

#[derive(Debug, Error)]
#[error("Unsupported prompt type: '{0}'. Supported types: summary")]
pub struct UnsupportedPromptType(String);

impl FromStr for PromptKind {
    type Err = UnsupportedPromptType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(PromptKind::Summary),
            other => Err(UnsupportedPromptType(other.to_string())),
        }
    }
}

/// Build the narrative-summary prompt for a transcription.
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Rewrite the following transcription into a concise, coherent, \
and engaging narrative that preserves all key ideas, insights, and examples from the video. \
Do not just summarize - create a shortened version that reads like a well-crafted article or essay. \
Include relevant expert commentary, detailed examples, and clear explanations where applicable. \
Exclude advertisements, CTA's, promotional content, and any non-essential information. \
Ensure the structure is logical and the flow natural, making it easy and enjoyable to read.\n\
Transcription:\n{text}"
    )
}
