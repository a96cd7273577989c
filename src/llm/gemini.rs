use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::llm::client::{LanguageModel, LlmError};

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Gemini REST backend.
///
/// Uses `generateContent` for prompting and `countTokens` for exact token
/// counts, falling back to the heuristic estimator when counting fails.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_input_tokens: usize,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!(
                "Gemini API key is missing. Set llm.api_key in config or VIDSUM_GEMINI_API_KEY."
            );
        }

        let model = if settings.llm.model.trim().is_empty() {
            DEFAULT_GEMINI_MODEL.to_string()
        } else {
            settings.llm.model.trim().to_string()
        };

        let endpoint = if settings.llm.endpoint.trim().is_empty() {
            DEFAULT_GEMINI_ENDPOINT.to_string()
        } else {
            settings
                .llm
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        tracing::info!(
            "Gemini initialized with max token limit: {}",
            settings.llm.max_input_tokens
        );

        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to build Gemini HTTP client: {e}"))?,
            api_key,
            model,
            endpoint,
            max_input_tokens: settings.llm.max_input_tokens,
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    fn count_url(&self) -> String {
        format!(
            "{}/models/{}:countTokens?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    async fn request_count(&self, text: &str) -> Result<usize, LlmError> {
        let body = GeminiRequest::from_text(text);

        let response = self.http.post(self.count_url()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!(
                "countTokens returned {status}: {detail}"
            )));
        }

        let payload: GeminiCountTokensResponse = response.json().await?;
        Ok(payload.total_tokens.unwrap_or(0))
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn ask(&self, prompt: &str) -> Result<String, LlmError> {
        tracing::debug!("Calling Gemini with a prompt of {} characters", prompt.len());

        let body = GeminiRequest::from_text(prompt);
        let response = self
            .http
            .post(self.generate_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            if status == StatusCode::TOO_MANY_REQUESTS || detail.contains("RESOURCE_EXHAUSTED") {
                return Err(LlmError::QuotaExceeded(format!("{status}: {detail}")));
            }
            return Err(LlmError::Api(format!(
                "generateContent returned {status}: {detail}"
            )));
        }

        let payload: GeminiGenerateContentResponse = response.json().await?;

        payload
            .candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }

    async fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        match self.request_count(text).await {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!("Token counting API failed: {err}. Falling back to heuristic.");
                self.estimate_tokens(text)
            }
        }
    }

    fn token_limit(&self) -> usize {
        self.max_input_tokens
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    fn from_text(text: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: text.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiGenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCountTokensResponse {
    total_tokens: Option<usize>,
}
