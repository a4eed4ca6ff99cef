//! OpenAI-compatible chat-completions adapter.
//!
//! Works against any provider exposing `POST {base_url}/chat/completions`
//! with bearer authentication. The default endpoint and model target xAI's
//! Grok API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::trait_def::{ModelClient, PromptRequest};
use crate::error::ModelError;

/// Connection and sampling settings for [`ChatCompletionsClient`].
#[derive(Clone)]
pub struct ChatCompletionsConfig {
    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request HTTP timeout. `None` leaves requests unbounded; callers
    /// are expected to bound the whole generation run instead.
    pub request_timeout: Option<Duration>,
}

impl ChatCompletionsConfig {
    pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
    pub const DEFAULT_MODEL: &str = "grok-2";
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Config with the default endpoint, model, and temperature.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            temperature: Self::DEFAULT_TEMPERATURE,
            request_timeout: None,
        }
    }

    /// Full URL of the completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ChatCompletionsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// [`ModelClient`] backed by an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    config: ChatCompletionsConfig,
    http: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Build a client. Fails if the API key is blank or the HTTP client
    /// cannot be constructed.
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, ModelError> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::Config("API key is empty".to_string()));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ChatCompletionsConfig {
        &self.config
    }

    fn request_body<'a>(&'a self, prompt: &'a PromptRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl ModelClient for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn generate(&self, prompt: &PromptRequest) -> Result<String, ModelError> {
        let body = self.request_body(prompt);
        tracing::debug!(model = %self.config.model, endpoint = %self.config.endpoint(), "sending chat completion request");

        let response = self
            .http
            .post(self.config.endpoint())
            .bearer_auth(self.config.api_key.trim())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        content_from_response(&text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's message content out of a completions response.
fn content_from_response(body: &str) -> Result<String, ModelError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(ModelError::MissingContent)?;
    if content.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> PromptRequest {
        PromptRequest {
            system: "You are a planner.".to_string(),
            user: "Plan a trip.".to_string(),
        }
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let mut config = ChatCompletionsConfig::new("key");
        config.base_url = "http://localhost:8080/v1/".to_string();
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn defaults_target_grok() {
        let config = ChatCompletionsConfig::new("key");
        assert_eq!(config.endpoint(), "https://api.x.ai/v1/chat/completions");
        assert_eq!(config.model, "grok-2");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", ChatCompletionsConfig::new("xai-secret"));
        assert!(!rendered.contains("xai-secret"));
        assert!(rendered.contains("grok-2"));
    }

    #[test]
    fn rejects_blank_api_key() {
        let err = ChatCompletionsClient::new(ChatCompletionsConfig::new("  ")).unwrap_err();
        assert!(matches!(err, ModelError::Config(_)), "got: {err}");
    }

    #[test]
    fn request_body_has_system_then_user_message() {
        let client = ChatCompletionsClient::new(ChatCompletionsConfig::new("key")).unwrap();
        let prompt = prompt();
        let body = serde_json::to_value(client.request_body(&prompt)).unwrap();

        assert_eq!(body["model"], "grok-2");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a planner.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Plan a trip.");
    }

    #[test]
    fn content_is_taken_from_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"title\":\"x\"}"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(content_from_response(body).unwrap(), r#"{"title":"x"}"#);
    }

    #[test]
    fn missing_choices_is_missing_content() {
        let err = content_from_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ModelError::MissingContent), "got: {err}");

        let err = content_from_response(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert!(matches!(err, ModelError::MissingContent), "got: {err}");
    }

    #[test]
    fn blank_content_is_empty_response() {
        let err = content_from_response(r#"{"choices":[{"message":{"content":"  \n"}}]}"#).unwrap_err();
        assert!(matches!(err, ModelError::EmptyResponse), "got: {err}");
    }

    #[test]
    fn non_json_body_is_decode_error() {
        let err = content_from_response("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ModelError::Decode(_)), "got: {err}");
    }
}
