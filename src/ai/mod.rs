//! Completion client: one prompt in, the model's text out.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

mod error;

pub use error::AIError;
use crate::config::{AIConfig, AIProvider};

const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const ANTHROPIC_URL: &str = "https://api.anthropic.com";
const OPENAI_URL: &str = "https://api.openai.com";

const SYSTEM_PROMPT: &str = "You are Git Glance, an assistant that helps developers understand and work with their git repositories.";

#[async_trait]
pub trait CompletionClient {
    /// Sends `prompt` and returns the generated text. Never retries.
    async fn generate(&self, prompt: &str) -> Result<String, AIError>;
}

pub struct HttpCompletionClient {
    http: reqwest::Client,
    config: AIConfig,
}

impl HttpCompletionClient {
    pub fn new(config: &AIConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    fn api_key(&self) -> Result<&str, AIError> {
        self.config.api_key().ok_or_else(|| AIError::MissingApiKey {
            provider: self.config.provider.to_string(),
            variable: self.config.provider.key_variable(),
        })
    }

    fn endpoint(&self) -> String {
        let base = self.config.api_url.as_deref().unwrap_or(match self.config.provider {
            AIProvider::Gemini => GEMINI_URL,
            AIProvider::Anthropic => ANTHROPIC_URL,
            AIProvider::OpenAI => OPENAI_URL,
        });
        let base = base.trim_end_matches('/');

        match self.config.provider {
            AIProvider::Gemini => format!(
                "{}/v1beta/models/{}:generateContent",
                base,
                self.config.model()
            ),
            AIProvider::Anthropic => format!("{}/v1/messages", base),
            AIProvider::OpenAI => format!("{}/v1/chat/completions", base),
        }
    }

    fn headers(&self, api_key: &str) -> Result<HeaderMap, AIError> {
        let invalid = |e: reqwest::header::InvalidHeaderValue| {
            AIError::Authentication(format!("Invalid API key: {}", e))
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match self.config.provider {
            AIProvider::Gemini => {
                headers.insert("x-goog-api-key", HeaderValue::from_str(api_key).map_err(invalid)?);
            }
            AIProvider::Anthropic => {
                headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
                headers.insert("x-api-key", HeaderValue::from_str(api_key).map_err(invalid)?);
            }
            AIProvider::OpenAI => {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(invalid)?,
                );
            }
        }
        Ok(headers)
    }

    fn body(&self, prompt: &str) -> Value {
        match self.config.provider {
            AIProvider::Gemini => json!({
                "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                "generationConfig": { "maxOutputTokens": self.config.max_tokens }
            }),
            AIProvider::Anthropic => json!({
                "model": self.config.model(),
                "max_tokens": self.config.max_tokens,
                "system": SYSTEM_PROMPT,
                "messages": [{ "role": "user", "content": prompt }]
            }),
            AIProvider::OpenAI => json!({
                "model": self.config.model(),
                "max_tokens": self.config.max_tokens,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": prompt }
                ]
            }),
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String, AIError> {
        let api_key = self.api_key()?;
        let url = self.endpoint();
        debug!(provider = %self.config.provider, %url, prompt_chars = prompt.len(), "requesting completion");

        let response = self
            .http
            .post(&url)
            .headers(self.headers(api_key)?)
            .json(&self.body(prompt))
            .send()
            .await
            .map_err(|e| AIError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AIError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(classify_status(status, body, self.config.model()));
        }

        let text = extract_text(self.config.provider, &body)?;
        debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}

pub(crate) fn classify_status(status: StatusCode, body: String, model: &str) -> AIError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => AIError::RateLimited(body),
        StatusCode::NOT_FOUND => AIError::ModelNotFound {
            model: model.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AIError::Authentication(body),
        status => AIError::Api {
            status: status.as_u16(),
            body,
        },
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Pulls the generated text out of a provider's response body.
pub(crate) fn extract_text(provider: AIProvider, body: &str) -> Result<String, AIError> {
    let text = match provider {
        AIProvider::Gemini => {
            let response: GeminiResponse = serde_json::from_str(body)?;
            response
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
        }
        AIProvider::Anthropic => {
            let response: AnthropicResponse = serde_json::from_str(body)?;
            (!response.content.is_empty())
                .then(|| response.content.into_iter().map(|p| p.text).collect::<String>())
        }
        AIProvider::OpenAI => {
            let response: OpenAIResponse = serde_json::from_str(body)?;
            response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
        }
    };

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(AIError::MalformedResponse(format!(
            "no text in response: {}",
            body.chars().take(200).collect::<String>()
        ))),
    }
}
