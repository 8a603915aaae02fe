//! Model client abstraction and hosted-API providers

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::{EthosError, Result};

pub mod models;
pub mod providers;
pub mod scripted;

pub use models::GroqModel;
pub use scripted::{ScriptedProvider, ScriptedReply};

/// Completion budget sent with every chat request.
pub const DEFAULT_MAX_TOKENS: usize = 2000;

/// Stream of text fragments produced by a provider.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Wire name used by OpenAI-compatible APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request to an LLM provider
#[derive(Debug, Clone)]
pub struct LLMRequest {
    /// Messages in the conversation, system prompt first
    pub messages: Vec<Message>,

    /// Model override; providers fall back to their default model
    pub model: Option<String>,

    /// Temperature for generation (0.0-1.0)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<usize>,
}

impl LLMRequest {
    /// Create a request from an ordered message list
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create a request with system prompt
    pub fn with_system_prompt(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self::new(vec![
            Message::system(system_prompt),
            Message::user(user_prompt),
        ])
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature, clamped to 0.0-1.0. Non-finite values are ignored.
    pub fn temperature(mut self, temperature: f32) -> Self {
        if temperature.is_finite() {
            self.temperature = Some(temperature.clamp(0.0, 1.0));
        }
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The system prompt, if the first message carries one
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Generated content
    pub content: String,

    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Trait for model-completion backends.
///
/// Implementors own the transport to a hosted chat API. Both calls receive
/// the fully assembled message list; they never see session state.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a full completion for the request.
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse>;

    /// Generate with streaming response.
    ///
    /// # Returns
    ///
    /// Stream of text chunks, in arrival order
    async fn generate_stream(&self, _request: &LLMRequest) -> Result<TokenStream> {
        Err(EthosError::StreamingUnsupported(self.model_info().provider))
    }

    /// Get model information
    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "unknown".to_string(),
            model_name: "unknown".to_string(),
        }
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub provider: String,
    pub model_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CompletionOnly;

    #[async_trait]
    impl LLMProvider for CompletionOnly {
        async fn generate_request(&self, _request: &LLMRequest) -> Result<LLMResponse> {
            Ok(LLMResponse {
                content: "ok".to_string(),
                usage: None,
            })
        }
    }

    #[test]
    fn test_request_builder() {
        let request = LLMRequest::with_system_prompt("You are helpful", "Hello")
            .model("llama-3.1-8b-instant")
            .temperature(0.4)
            .max_tokens(DEFAULT_MAX_TOKENS);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.system_prompt(), Some("You are helpful"));
        assert_eq!(request.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(request.max_tokens, Some(2000));
    }

    #[test]
    fn test_temperature_clamping() {
        let request = LLMRequest::new(Vec::new()).temperature(1.7);
        assert_eq!(request.temperature, Some(1.0));

        let request = LLMRequest::new(Vec::new()).temperature(-0.5);
        assert_eq!(request.temperature, Some(0.0));
    }

    #[test]
    fn test_non_finite_temperature_ignored() {
        let request = LLMRequest::new(Vec::new()).temperature(f32::NAN);
        assert_eq!(request.temperature, None);

        let request = LLMRequest::new(Vec::new())
            .temperature(0.3)
            .temperature(f32::INFINITY);
        assert_eq!(request.temperature, Some(0.3));
    }

    #[test]
    fn test_system_prompt_absent() {
        let request = LLMRequest::new(vec![Message::user("hi")]);
        assert!(request.system_prompt().is_none());
    }

    #[tokio::test]
    async fn test_streaming_unsupported_by_default() {
        let provider = CompletionOnly;
        let result = provider.generate_stream(&LLMRequest::new(Vec::new())).await;
        assert!(matches!(result, Err(EthosError::StreamingUnsupported(_))));
    }
}
