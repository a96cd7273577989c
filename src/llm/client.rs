//! Language model capability contract.
//!
//! The summarization pipeline depends only on the [`LanguageModel`] trait;
//! concrete backends implement the abstract methods while the retry loop and
//! the cheap token estimator are shared provided methods.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by language model backends and the reduction pipeline.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider-side rate/usage limit. Retryable with backoff.
    #[error("Model quota exhausted: {0}")]
    QuotaExceeded(String),

    /// Every retry attempt hit the quota limit.
    #[error("Failed to get a response after {attempts} attempts due to quota exhaustion")]
    RetriesExhausted { attempts: u32 },

    /// The model returned no usable text.
    #[error("Empty response from model")]
    EmptyResponse,

    /// Any other provider failure. Not retryable.
    #[error("Model API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The reduce loop failed to converge within the pass limit.
    #[error("Summarization did not converge within {depth} reduction passes")]
    MaxDepthExceeded { depth: usize },
}

impl LlmError {
    /// Whether a failed call may succeed if repeated after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::QuotaExceeded(_))
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Submit a prompt to the model once and return its trimmed response.
    async fn ask(&self, prompt: &str) -> Result<String, LlmError>;

    /// Exact token count of `text` per the model's tokenizer.
    ///
    /// Implementations absorb counting failures by falling back to
    /// [`LanguageModel::estimate_tokens`] with a warning, so chunking never
    /// aborts on a failed count.
    async fn count_tokens(&self, text: &str) -> usize;

    /// Maximum number of tokens a single prompt may contain.
    fn token_limit(&self) -> usize;

    /// Cheap token estimate, roughly four characters per token.
    fn estimate_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            0
        } else {
            (text.len() / 4).max(1)
        }
    }

    /// Submit a prompt, retrying on quota exhaustion with a fixed backoff.
    ///
    /// At least one attempt is always made, even with `max_retries` of zero.
    /// Non-quota errors propagate immediately. Exhausting every attempt
    /// surfaces [`LlmError::RetriesExhausted`] rather than the raw quota
    /// error; no backoff is slept after the final attempt.
    async fn ask_with_retry(
        &self,
        prompt: &str,
        max_retries: u32,
        backoff: Duration,
    ) -> Result<String, LlmError> {
        let attempts = max_retries.max(1);
        for attempt in 1..=attempts {
            match self.ask(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() => {
                    if attempt < attempts {
                        tracing::warn!(
                            "Quota exceeded (attempt {}/{}). Retrying in {}s...",
                            attempt,
                            attempts,
                            backoff.as_secs()
                        );
                        tokio::time::sleep(backoff).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(LlmError::RetriesExhausted { attempts })
    }
}
