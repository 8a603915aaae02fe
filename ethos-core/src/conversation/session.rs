//! Conversation Session

use chrono::{DateTime, Local};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ConversationConfig;
use crate::error::{EthosError, Result};
use crate::llm::{GroqModel, LLMProvider, LLMRequest, Message};
use crate::personality::PersonalityConfig;

use super::history::{ConversationHistory, Turn};
use super::stream::{self, ResponseStream};

/// One conversation under a fixed personality and model.
///
/// Owns the bounded history and drives the provider to produce the next
/// assistant turn. Changing personality or model means creating a new
/// session; nothing is migrated.
pub struct ConversationSession {
    id: Uuid,
    personality: Arc<PersonalityConfig>,
    model: GroqModel,
    temperature: f32,
    max_tokens: usize,
    keep_partial_replies: bool,
    history: ConversationHistory,
    provider: Arc<dyn LLMProvider>,
    created_at: DateTime<Local>,
}

impl ConversationSession {
    /// Create a session seeded with the personality's default temperature
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        personality: Arc<PersonalityConfig>,
        model: GroqModel,
        config: &ConversationConfig,
    ) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            temperature: personality.temperature.clamp(0.0, 1.0),
            personality,
            model,
            max_tokens: config.max_tokens,
            keep_partial_replies: config.keep_partial_replies,
            history: ConversationHistory::new(config.max_history),
            provider,
            created_at: Local::now(),
        };

        tracing::info!(
            session_id = %session.id,
            personality = %session.personality.id,
            model = %session.model,
            temperature = session.temperature,
            "Created conversation session"
        );

        session
    }

    /// Override the temperature (clamped to 0.0-1.0)
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.set_temperature(temperature);
        self
    }

    /// Set the temperature, clamped to 0.0-1.0.
    ///
    /// Non-finite values are ignored and the current temperature is kept.
    pub fn set_temperature(&mut self, temperature: f32) {
        if !temperature.is_finite() {
            tracing::warn!(session_id = %self.id, temperature, "Ignoring non-finite temperature");
            return;
        }
        self.temperature = temperature.clamp(0.0, 1.0);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn personality(&self) -> &Arc<PersonalityConfig> {
        &self.personality
    }

    pub fn model(&self) -> GroqModel {
        self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Stored turns; never contains the system prompt
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.history.iter()
    }

    pub fn exchange_count(&self) -> usize {
        self.history.exchange_count()
    }

    /// Clear history; personality, model and temperature are kept
    pub fn clear(&mut self) {
        self.history.clear();
        tracing::debug!(session_id = %self.id, "Cleared conversation history");
    }

    /// Assemble `[system prompt, ...history, user_text]`
    pub fn build_request(&self, user_text: &str) -> LLMRequest {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(self.personality.system_prompt.clone()));
        messages.extend(self.history.to_messages());
        messages.push(Message::user(user_text));

        LLMRequest::new(messages)
            .model(self.model.as_str())
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
    }

    /// Get the full reply, propagating provider failures.
    ///
    /// The exchange is recorded only on success.
    pub async fn complete(&mut self, user_text: &str) -> Result<String> {
        let user = Turn::user(user_text);
        let request = self.build_request(user_text);

        tracing::debug!(
            session_id = %self.id,
            messages = request.messages.len(),
            "Requesting completion"
        );

        let response = self.provider.generate_request(&request).await?;
        self.record_exchange(user, Turn::assistant(response.content.clone()));
        Ok(response.content)
    }

    /// Get the full reply, or a displayable error message.
    ///
    /// Failures never escape: they are logged and returned as text, and the
    /// history is left untouched.
    pub async fn get_response(&mut self, user_text: &str) -> String {
        match self.complete(user_text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "Completion failed");
                self.failure_message(&e)
            }
        }
    }

    /// Stream the reply fragment by fragment.
    ///
    /// The exchange is recorded once the stream is exhausted. A failure is
    /// delivered as a final [`StreamEvent::Error`](super::StreamEvent::Error);
    /// dropping the stream early records nothing.
    pub fn stream_response(&mut self, user_text: impl Into<String>) -> ResponseStream<'_> {
        stream::open(self, Turn::user(user_text))
    }

    pub(super) fn provider(&self) -> Arc<dyn LLMProvider> {
        Arc::clone(&self.provider)
    }

    pub(super) fn keeps_partial_replies(&self) -> bool {
        self.keep_partial_replies
    }

    pub(super) fn record_exchange(&mut self, user: Turn, assistant: Turn) {
        let dropped = self.history.push_exchange(user, assistant);
        tracing::debug!(
            session_id = %self.id,
            turns = self.history.len(),
            dropped,
            "Recorded exchange"
        );
    }

    fn failure_message(&self, error: &EthosError) -> String {
        format!(
            "Error communicating with {} API: {}",
            provider_display_name(&self.provider.model_info().provider),
            error
        )
    }
}

impl fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationSession")
            .field("id", &self.id)
            .field("personality", &self.personality.id)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("turns", &self.history.len())
            .finish()
    }
}

fn provider_display_name(provider: &str) -> String {
    let mut chars = provider.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
