//! Language model backends and the capability contract the pipeline uses.

mod client;
mod gemini;
mod prompts;

pub use client::{LanguageModel, LlmError};
pub use gemini::GeminiClient;
pub use prompts::{summary_prompt, PromptFn, PromptKind, UnsupportedPromptType};

use crate::config::Settings;

/// Build a language model backend from runtime settings.
pub fn build_model(settings: &Settings) -> anyhow::Result<Box<dyn LanguageModel>> {
    match settings.llm.provider.to_lowercase().as_str() {
        "gemini" => Ok(Box::new(GeminiClient::from_settings(settings)?)),
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: gemini",
            other
        ),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory model used by chunker and pipeline tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{LanguageModel, LlmError};

    /// One scripted outcome for a `MockModel::ask` call.
    #[derive(Debug, Clone)]
    pub enum Reply {
        Text(&'static str),
        Quota,
        Fail(&'static str),
    }

    pub struct MockModel {
        limit: usize,
        /// Exact counts are `estimate * exact_factor`, letting tests simulate
        /// an estimator that undercounts.
        exact_factor: usize,
        script: Mutex<VecDeque<Reply>>,
        asked: Mutex<Vec<String>>,
    }

    impl MockModel {
        pub fn new(limit: usize) -> Self {
            Self {
                limit,
                exact_factor: 1,
                script: Mutex::new(VecDeque::new()),
                asked: Mutex::new(Vec::new()),
            }
        }

        pub fn with_exact_factor(mut self, factor: usize) -> Self {
            self.exact_factor = factor;
            self
        }

        pub fn with_script(self, replies: &[Reply]) -> Self {
            self.script
                .lock()
                .expect("script lock")
                .extend(replies.iter().cloned());
            self
        }

        pub fn ask_count(&self) -> usize {
            self.asked.lock().expect("asked lock").len()
        }
    }

    #[async_trait]
    impl LanguageModel for MockModel {
        async fn ask(&self, prompt: &str) -> Result<String, LlmError> {
            self.asked
                .lock()
                .expect("asked lock")
                .push(prompt.to_string());

            let reply = self.script.lock().expect("script lock").pop_front();
            match reply {
                Some(Reply::Text(text)) => Ok(text.trim().to_string()),
                Some(Reply::Quota) => Err(LlmError::QuotaExceeded("scripted".into())),
                Some(Reply::Fail(msg)) => Err(LlmError::Api(msg.into())),
                None => Ok(format!("summary:{}", prompt.len())),
            }
        }

        async fn count_tokens(&self, text: &str) -> usize {
            self.estimate_tokens(text) * self.exact_factor
        }

        fn token_limit(&self) -> usize {
            self.limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn unsupported_provider_returns_error() {
        let mut settings = Settings::default();
        settings.llm.provider = "unknown".to_string();

        let err = match build_model(&settings) {
            Ok(_) => panic!("expected model creation to fail"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("Unsupported llm.provider"));
    }

    #[test]
    fn gemini_backend_requires_api_key() {
        let settings = Settings::default();

        let err = match build_model(&settings) {
            Ok(_) => panic!("expected model creation to fail"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("Gemini API key is missing"));
    }
}
