//! Groq LLM provider implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use crate::config::LlmConfig;
use crate::error::{EthosError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, Message, ModelInfo, TokenStream, TokenUsage};

/// Environment variable holding the Groq credential.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Public Groq OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Groq LLM provider (OpenAI-compatible chat completions).
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqProvider {
    /// Create a new Groq provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Groq API key
    /// * `model` - Default model name (e.g., "llama-3.3-70b-versatile")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GROQ_BASE_URL.to_string(),
        }
    }

    /// Create with a custom base URL (proxies, test servers).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let mut provider = Self::new(api_key, model);
        provider.base_url = base_url.into().trim_end_matches('/').to_string();
        provider
    }

    /// Create from environment variables.
    ///
    /// Reads `GROQ_API_KEY` (required). The model defaults to
    /// "llama-3.3-70b-versatile" when not provided.
    ///
    /// # Errors
    ///
    /// Returns an error if GROQ_API_KEY is not set.
    pub fn from_env(model: Option<impl Into<String>>) -> Result<Self> {
        let api_key = std::env::var(GROQ_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EthosError::MissingCredential(GROQ_API_KEY_ENV.to_string()))?;

        let model = model
            .map(Into::into)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, model))
    }

    /// Create from the `[llm]` configuration section.
    ///
    /// The credential comes from `llm.api_key`, falling back to
    /// `GROQ_API_KEY`. Timeouts are applied to the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`EthosError::MissingCredential`] when neither source is set.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = build_client(config.request_timeout, config.connect_timeout)?;

        Ok(Self {
            client,
            api_key,
            model: config.model.as_str().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the default model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_body<'a>(&'a self, request: &'a LLMRequest, stream: bool) -> GroqRequest<'a> {
        GroqRequest {
            model: request.model.as_deref().unwrap_or(&self.model),
            messages: convert_messages(&request.messages),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }

    async fn post(&self, body: &GroqRequest<'_>) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(
            model = body.model,
            messages = body.messages.len(),
            stream = body.stream,
            "Sending Groq chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(api_error(status, &text));
        }

        Ok(response)
    }
}

fn build_client(request_timeout: Duration, connect_timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .build()?)
}

#[derive(Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: Vec<GroqMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct GroqMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
    usage: Option<GroqUsage>,
}

#[derive(Deserialize)]
struct GroqChoice {
    message: Option<GroqMessageResponse>,
    delta: Option<GroqDelta>,
}

#[derive(Deserialize)]
struct GroqMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct GroqDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct GroqUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Deserialize)]
struct GroqStreamChunk {
    choices: Vec<GroqChoice>,
}

#[derive(Deserialize)]
struct GroqError {
    error: GroqErrorDetail,
}

#[derive(Deserialize)]
struct GroqErrorDetail {
    message: String,
}

fn convert_messages(messages: &[Message]) -> Vec<GroqMessage<'_>> {
    messages
        .iter()
        .map(|m| GroqMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect()
}

fn api_error(status: u16, body: &str) -> EthosError {
    let message = serde_json::from_str::<GroqError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    EthosError::Api { status, message }
}

/// Decode one server-sent-events line of a streaming completion.
///
/// Returns `None` for lines that carry no text (comments, blank lines,
/// role-only deltas, the `[DONE]` sentinel).
pub(crate) fn parse_sse_line(line: &str) -> Option<Result<String>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<GroqStreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .filter(|content| !content.is_empty())
            .map(Ok),
        Err(e) => Some(Err(EthosError::MalformedResponse(format!(
            "Failed to parse stream chunk: {}",
            e
        )))),
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let body = self.build_body(request, false);
        let response = self.post(&body).await?;

        let groq_response: GroqResponse = response.json().await.map_err(|e| {
            EthosError::MalformedResponse(format!("Failed to parse Groq response: {}", e))
        })?;

        let content = groq_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| EthosError::MalformedResponse("Groq API returned no choices".to_string()))?
            .message
            .and_then(|m| m.content)
            .unwrap_or_default();

        let usage = groq_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LLMResponse { content, usage })
    }

    async fn generate_stream(&self, request: &LLMRequest) -> Result<TokenStream> {
        let body = self.build_body(request, true);
        let response = self.post(&body).await?;

        // Convert response bytes to a stream of lines
        let bytes_stream = response.bytes_stream();
        let reader = tokio_util::io::StreamReader::new(bytes_stream.map(|r| r.map_err(std::io::Error::other)));
        let lines = tokio::io::BufReader::new(reader).lines();
        let lines_stream = LinesStream::new(lines);

        let stream = lines_stream.filter_map(|line_result| match line_result {
            Ok(line) => parse_sse_line(&line),
            Err(e) => Some(Err(EthosError::Stream(format!("Stream read error: {}", e)))),
        });

        Ok(Box::pin(stream))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "groq".to_string(),
            model_name: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    #[test]
    fn test_groq_provider_creation() {
        let provider = GroqProvider::new("test-key", "llama-3.3-70b-versatile");
        assert_eq!(provider.model(), "llama-3.3-70b-versatile");
        assert_eq!(provider.base_url(), GROQ_BASE_URL);
    }

    #[test]
    fn test_custom_base_url_trims_slash() {
        let provider = GroqProvider::with_base_url("k", "m", "http://localhost:9000/v1/");
        assert_eq!(provider.base_url(), "http://localhost:9000/v1");
    }

    #[test]
    fn test_from_config_with_explicit_key() {
        let config = LlmConfig {
            api_key: Some("config-key".to_string()),
            ..LlmConfig::default()
        };
        let provider = GroqProvider::from_config(&config).unwrap();
        assert_eq!(provider.model(), "llama-3.3-70b-versatile");
        assert_eq!(provider.model_info().provider, "groq");
    }

    #[test]
    fn test_request_body_prefers_request_model() {
        let provider = GroqProvider::new("k", "llama-3.3-70b-versatile");
        let request = LLMRequest::with_system_prompt("sys", "hi")
            .model("gemma2-9b-it")
            .temperature(0.5)
            .max_tokens(2000);

        let body = serde_json::to_value(provider.build_body(&request, true)).unwrap();
        assert_eq!(body["model"], "gemma2-9b-it");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_non_streaming_body_omits_stream_flag() {
        let provider = GroqProvider::new("k", "llama-3.1-8b-instant");
        let request = LLMRequest::new(vec![Message::user("hi")]);

        let body = serde_json::to_value(provider.build_body(&request, false)).unwrap();
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert!(body.get("stream").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_convert_messages() {
        let messages = vec![
            Message::system("You are helpful"),
            Message::user("Hello"),
            Message::assistant("Hi there!"),
        ];

        let converted = convert_messages(&messages);

        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[1].role, "user");
        assert_eq!(converted[2].role, "assistant");
        assert_eq!(messages[0].role, MessageRole::System);
    }

    #[test]
    fn test_parse_sse_content() {
        let line = r#"data: {"id":"x","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap().unwrap(), "Hel");
    }

    #[test]
    fn test_parse_sse_skips_non_content() {
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("data: [DONE]").is_none());
        assert!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant","content":""}}]}"#)
                .is_none()
        );
        assert!(parse_sse_line(r#"data: {"choices":[]}"#).is_none());
    }

    #[test]
    fn test_parse_sse_malformed() {
        let result = parse_sse_line("data: {not json").unwrap();
        assert!(matches!(result, Err(EthosError::MalformedResponse(_))));
    }

    #[test]
    fn test_api_error_extracts_message() {
        let err = api_error(401, r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#);
        match err {
            EthosError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = api_error(502, "Bad Gateway");
        assert!(matches!(err, EthosError::Api { status: 502, ref message } if message == "Bad Gateway"));
    }
}
