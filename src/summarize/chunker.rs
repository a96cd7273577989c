//! Token-aware text chunking.
//!
//! Two-pass design: a greedy bin-packing pass over sentence-level token
//! *estimates* keeps the common case cheap, then a verification pass
//! recomputes the *exact* token count of every chunk's rendered prompt and
//! recursively re-chunks anything the estimator undercounted. Every emitted
//! chunk (except the midpoint fallback for an unsplittable sentence) is
//! guaranteed to fit the token budget exactly.

use futures_util::future::BoxFuture;

use crate::llm::{LanguageModel, PromptFn};

use super::sentences::{split_sentences, split_sentences_relaxed};

/// Verification recursion stops past this depth and accepts the oversized
/// chunk, so pathological input cannot recurse forever.
const MAX_RECHUNK_DEPTH: usize = 8;

/// Split `text` into ordered chunks whose rendered prompts fit within
/// `max_tokens` per the model's exact token counter.
///
/// Returns an empty vector for empty input. A single sentence that cannot
/// fit the budget is first re-split on bare terminators (uncapitalized
/// transcripts); only text with no usable punctuation at all is split at its
/// character midpoint into exactly two pieces, which are accepted oversized.
pub async fn chunk_text(
    model: &dyn LanguageModel,
    render: PromptFn,
    text: &str,
    max_tokens: usize,
) -> Vec<String> {
    chunk_at_depth(model, render, text.to_string(), max_tokens, 0).await
}

fn chunk_at_depth(
    model: &dyn LanguageModel,
    render: PromptFn,
    text: String,
    max_tokens: usize,
    depth: usize,
) -> BoxFuture<'_, Vec<String>> {
    Box::pin(async move {
        let mut sentences = split_sentences(&text);
        if sentences.is_empty() {
            return Vec::new();
        }

        if sentences.len() == 1 {
            let sentence = &sentences[0];
            let actual = model.count_tokens(&render(sentence)).await;
            if actual > max_tokens {
                // Uncapitalized transcripts defeat the strict splitter; retry
                // on bare terminators before giving up on punctuation.
                let relaxed = split_sentences_relaxed(sentence);
                if relaxed.len() > 1 {
                    tracing::debug!(
                        "An oversized sentence of {} tokens re-split into {} relaxed sentences.",
                        actual,
                        relaxed.len()
                    );
                    sentences = relaxed;
                } else {
                    tracing::warn!(
                        "A single sentence of {} tokens exceeds the max limit of {}. \
                         Splitting it at the character midpoint.",
                        actual,
                        max_tokens
                    );
                    return midpoint_split(sentence);
                }
            }
        }

        // Greedy bin-packing over per-sentence token costs. The top-level
        // pass uses the cheap estimator; re-chunking passes (depth > 0)
        // exist because the estimator undercounted, so they pay for exact
        // counts instead. A chunk always keeps at least one sentence, even
        // when that sentence alone is costed over the budget.
        let mut initial_chunks: Vec<String> = Vec::new();
        let mut current_sentences: Vec<String> = Vec::new();
        let mut current_tokens = 0usize;

        for sentence in sentences {
            let estimated = if depth == 0 {
                model.estimate_tokens(&render(&sentence))
            } else {
                model.count_tokens(&render(&sentence)).await
            };

            if current_tokens + estimated > max_tokens && !current_sentences.is_empty() {
                initial_chunks.push(current_sentences.join(" ").trim().to_string());
                current_sentences = vec![sentence];
                current_tokens = estimated;
            } else {
                current_sentences.push(sentence);
                current_tokens += estimated;
            }
        }
        if !current_sentences.is_empty() {
            initial_chunks.push(current_sentences.join(" ").trim().to_string());
        }

        tracing::debug!(
            "Initial split created {} chunks using estimation. Verifying...",
            initial_chunks.len()
        );

        // Verification pass with the exact counter.
        let mut final_chunks: Vec<String> = Vec::new();
        let mut oversized_count = 0usize;

        for chunk in initial_chunks {
            let actual = model.count_tokens(&render(&chunk)).await;

            if actual <= max_tokens {
                final_chunks.push(chunk);
                continue;
            }

            if depth >= MAX_RECHUNK_DEPTH {
                tracing::warn!(
                    "Re-chunk depth limit {} reached; accepting an oversized chunk of {} tokens.",
                    MAX_RECHUNK_DEPTH,
                    actual
                );
                final_chunks.push(chunk);
                continue;
            }

            oversized_count += 1;
            tracing::warn!(
                "Oversized chunk detected (estimated OK, but actual is {} > {}). \
                 Re-chunking it with the precise method.",
                actual,
                max_tokens
            );
            let sub_chunks = chunk_at_depth(model, render, chunk, max_tokens, depth + 1).await;
            final_chunks.extend(sub_chunks);
        }

        if oversized_count > 0 {
            tracing::debug!(
                "Verification complete. Re-split {} oversized chunks. Final chunk count: {}.",
                oversized_count,
                final_chunks.len()
            );
        } else {
            tracing::debug!("Verification complete. All estimated chunks were within the limit.");
        }

        final_chunks
    })
}

/// Split a sentence into two halves at the character midpoint.
fn midpoint_split(sentence: &str) -> Vec<String> {
    let half = sentence.chars().count() / 2;
    let byte = sentence
        .char_indices()
        .nth(half)
        .map(|(idx, _)| idx)
        .unwrap_or(sentence.len());
    vec![sentence[..byte].to_string(), sentence[byte..].to_string()]
}
