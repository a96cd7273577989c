//! Recursive map-reduce summarization.
//!
//! A text that fits the model's token budget is summarized in one call.
//! Anything larger is chunked ([`chunker`]), each chunk is summarized
//! concurrently, and the concatenated partial summaries are fed back through
//! the same reduction until one pass suffices.

mod chunker;
mod sentences;

pub use chunker::chunk_text;
pub use sentences::split_sentences;

use std::time::Duration;

use futures_util::{stream, StreamExt};

use crate::config::Settings;
use crate::llm::{LanguageModel, LlmError, PromptKind};

/// Hard ceiling on reduction passes. Summarization shrinks text on every
/// pass in practice; if it ever stops shrinking we fail instead of looping.
pub const MAX_REDUCTION_DEPTH: usize = 10;

/// Knobs for the per-chunk model calls.
#[derive(Debug, Clone, Copy)]
pub struct SummarizeOptions {
    /// Attempts per model call before quota exhaustion becomes fatal.
    pub max_retries: u32,
    /// Sleep between quota-exhausted attempts.
    pub backoff: Duration,
    /// Maximum simultaneous in-flight chunk calls.
    pub concurrency: usize,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Duration::from_secs(30),
            concurrency: 4,
        }
    }
}

impl SummarizeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_retries: settings.llm.max_retries,
            backoff: Duration::from_secs(settings.llm.backoff_secs),
            concurrency: settings.llm.concurrency.max(1),
        }
    }
}

/// Produce a single summary for `text`, regardless of its length.
///
/// Any non-quota model error aborts the whole pipeline; no partial results
/// are returned. When one chunk fails, its in-flight siblings are still
/// driven to completion before the first error (in chunk order) surfaces.
pub async fn summarize(
    model: &dyn LanguageModel,
    kind: PromptKind,
    text: &str,
    opts: SummarizeOptions,
) -> Result<String, LlmError> {
    let render = kind.renderer();
    let mut text = text.to_string();

    for pass in 0..MAX_REDUCTION_DEPTH {
        let prompt = render(&text);
        let total_tokens = model.count_tokens(&prompt).await;
        tracing::debug!(
            "Reduction pass {}: prompt weighs {} tokens (limit {})",
            pass,
            total_tokens,
            model.token_limit()
        );

        if total_tokens <= model.token_limit() {
            let answer = model
                .ask_with_retry(&prompt, opts.max_retries, opts.backoff)
                .await?;
            return Ok(answer.trim().to_string());
        }

        let chunks = chunk_text(model, render, &text, model.token_limit()).await;
        tracing::debug!("Text split into {} chunks for summarization.", chunks.len());

        // Ordered, bounded fan-out: `buffered` keeps at most `concurrency`
        // calls in flight and yields results in chunk order, not completion
        // order. Collecting everything first lets siblings finish before an
        // error is raised.
        let answers: Vec<Result<String, LlmError>> = stream::iter(chunks.into_iter().map(|chunk| {
            let prompt = render(&chunk);
            async move {
                model
                    .ask_with_retry(&prompt, opts.max_retries, opts.backoff)
                    .await
            }
        }))
        .buffered(opts.concurrency.max(1))
        .collect()
        .await;

        let mut partials = Vec::with_capacity(answers.len());
        for answer in answers {
            partials.push(answer?);
        }

        text = partials.join("\n\n");
    }

    Err(LlmError::MaxDepthExceeded {
        depth: MAX_REDUCTION_DEPTH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{MockModel, Reply};

    fn opts() -> SummarizeOptions {
        SummarizeOptions {
            max_retries: 3,
            backoff: Duration::from_secs(30),
            concurrency: 4,
        }
    }

    #[tokio::test]
    async fn short_text_issues_exactly_one_call() {
        let model = MockModel::new(10_000).with_script(&[Reply::Text("  a tidy summary  ")]);

        let result = summarize(&model, PromptKind::Summary, "A short transcript.", opts())
            .await
            .unwrap();

        assert_eq!(result, "a tidy summary");
        assert_eq!(model.ask_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn long_text_fans_out_then_reduces_in_order() {
        use std::sync::Mutex;

        // Replies with a sequence tag so the reduce prompt exposes both the
        // number of fan-out calls and their order.
        struct TaggingModel {
            calls: Mutex<Vec<String>>,
        }

        #[async_trait::async_trait]
        impl LanguageModel for TaggingModel {
            async fn ask(&self, prompt: &str) -> Result<String, LlmError> {
                let mut calls = self.calls.lock().expect("calls lock");
                calls.push(prompt.to_string());
                Ok(format!("part {:03} done.", calls.len()))
            }

            async fn count_tokens(&self, text: &str) -> usize {
                self.estimate_tokens(text)
            }

            fn token_limit(&self) -> usize {
                400
            }
        }

        let sentences: Vec<String> = (0..60)
            .map(|i| format!("Sentence number {i:02} covers the topic of item {i:02} today."))
            .collect();
        let text = sentences.join(" ");

        let model = TaggingModel {
            calls: Mutex::new(Vec::new()),
        };

        // The chunker is deterministic for this model, so the expected
        // fan-out width can be computed up front.
        let render = PromptKind::Summary.renderer();
        let expected_chunks = chunk_text(&model, render, &text, model.token_limit())
            .await
            .len();
        assert!(expected_chunks >= 3);

        let result = summarize(&model, PromptKind::Summary, &text, opts())
            .await
            .unwrap();

        // One call per chunk, then one reduce call whose answer is final.
        let calls = model.calls.lock().expect("calls lock").clone();
        assert_eq!(calls.len(), expected_chunks + 1);
        assert_eq!(result, format!("part {:03} done.", calls.len()));

        // The reduce prompt embeds the partials in original chunk order,
        // joined by a blank line.
        let reduce_prompt = calls.last().unwrap();
        assert!(reduce_prompt.contains("part 001 done.\n\npart 002 done.\n\npart 003 done."));
        let expected_join: Vec<String> = (1..=expected_chunks)
            .map(|i| format!("part {i:03} done."))
            .collect();
        assert!(reduce_prompt.contains(&expected_join.join("\n\n")));
    }

    #[tokio::test(start_paused = true)]
    async fn quota_errors_are_retried_until_success() {
        let model = MockModel::new(10_000).with_script(&[
            Reply::Quota,
            Reply::Quota,
            Reply::Text("third time lucky"),
        ]);

        let result = summarize(&model, PromptKind::Summary, "Short enough.", opts())
            .await
            .unwrap();

        assert_eq!(result, "third time lucky");
        // Two quota failures plus the success: three attempts total.
        assert_eq!(model.ask_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_a_distinct_error() {
        let model =
            MockModel::new(10_000).with_script(&[Reply::Quota, Reply::Quota, Reply::Quota]);

        let err = summarize(&model, PromptKind::Summary, "Short enough.", opts())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RetriesExhausted { attempts: 3 }));
        assert_eq!(model.ask_count(), 3);
    }

    #[tokio::test]
    async fn non_quota_errors_abort_immediately() {
        let model = MockModel::new(10_000).with_script(&[Reply::Fail("model exploded")]);

        let err = summarize(&model, PromptKind::Summary, "Short enough.", opts())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api(_)));
        assert_eq!(model.ask_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn chunk_failure_fails_the_whole_pipeline() {
        let sentences: Vec<String> = (0..100)
            .map(|i| format!("Sentence number {i} covers the topic of item {i} today."))
            .collect();
        let text = sentences.join(" ");

        // Second chunk fails hard after the retries; no partial output.
        let model = MockModel::new(200).with_script(&[
            Reply::Text("alpha"),
            Reply::Fail("model exploded"),
        ]);

        let err = summarize(&model, PromptKind::Summary, &text, opts())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api(_)));
    }

    #[tokio::test]
    async fn reduction_that_never_shrinks_hits_the_depth_cap() {
        // The tokenizer insists nothing ever fits, so the reduce loop can
        // never converge and must stop at the pass limit.
        struct StubbornModel;

        #[async_trait::async_trait]
        impl LanguageModel for StubbornModel {
            async fn ask(&self, _prompt: &str) -> Result<String, LlmError> {
                Ok("an answer that never shrinks".to_string())
            }

            async fn count_tokens(&self, _text: &str) -> usize {
                1000
            }

            fn token_limit(&self) -> usize {
                200
            }
        }

        let err = summarize(
            &StubbornModel,
            PromptKind::Summary,
            "a transcript with no punctuation that never fits",
            opts(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            LlmError::MaxDepthExceeded {
                depth: MAX_REDUCTION_DEPTH
            }
        ));
    }
}
