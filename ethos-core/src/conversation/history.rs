//! Bounded message history

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::llm::{Message, MessageRole};

/// Author of a stored turn. The system prompt is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Capitalised label used in transcripts
    pub fn label(&self) -> &'static str {
        match self {
            TurnRole::User => "User",
            TurnRole::Assistant => "Assistant",
        }
    }
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Local>,
}

impl Turn {
    /// Create a turn stamped with the current local time
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Local::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == TurnRole::User
    }

    /// Convert to an LLM message
    pub fn to_message(&self) -> Message {
        Message {
            role: self.role.into(),
            content: self.content.clone(),
        }
    }
}

/// Rolling window of the most recent exchanges.
///
/// Holds at most `2 * max_history` turns. Turns are only ever added in
/// user/assistant pairs, oldest first out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    max_history: usize,
}

impl ConversationHistory {
    /// Create a history retaining `max_history` exchanges (at least one)
    pub fn new(max_history: usize) -> Self {
        let max_history = max_history.max(1);
        Self {
            turns: VecDeque::with_capacity(max_history * 2),
            max_history,
        }
    }

    /// Append a completed exchange, then trim to capacity.
    ///
    /// Returns the number of turns dropped from the front.
    pub fn push_exchange(&mut self, user: Turn, assistant: Turn) -> usize {
        self.turns.push_back(user);
        self.turns.push_back(assistant);
        self.truncate()
    }

    fn truncate(&mut self) -> usize {
        let capacity = self.capacity();
        let mut dropped = 0;
        while self.turns.len() > capacity {
            self.turns.pop_front();
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, retained = self.turns.len(), "Truncated conversation history");
        }
        dropped
    }

    /// Exchanges retained
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Turns retained (`2 * max_history`)
    pub fn capacity(&self) -> usize {
        self.max_history * 2
    }

    /// Iterate turns, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Turn> + ExactSizeIterator {
        self.turns.iter()
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    /// Get turn count
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Complete exchanges held
    pub fn exchange_count(&self) -> usize {
        self.turns.len() / 2
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Convert to LLM messages, oldest first
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(history: &mut ConversationHistory, exchanges: usize) {
        for i in 1..=exchanges {
            history.push_exchange(
                Turn::user(format!("msg-{}", i)),
                Turn::assistant(format!("reply-{}", i)),
            );
        }
    }

    #[test]
    fn test_turn_creation() {
        let turn = Turn::user("Hello");
        assert!(turn.is_user());
        assert_eq!(turn.role.label(), "User");
        assert_eq!(turn.to_message().role, MessageRole::User);
        assert_eq!(Turn::assistant("Hi").to_message().role, MessageRole::Assistant);
    }

    #[test]
    fn test_push_within_capacity() {
        let mut history = ConversationHistory::new(3);
        fill(&mut history, 3);

        assert_eq!(history.len(), 6);
        assert_eq!(history.exchange_count(), 3);
        assert_eq!(history.iter().next().unwrap().content, "msg-1");
    }

    #[test]
    fn test_fifo_truncation() {
        let mut history = ConversationHistory::new(2);
        fill(&mut history, 2);

        let dropped = history.push_exchange(Turn::user("msg-3"), Turn::assistant("reply-3"));
        assert_eq!(dropped, 2);
        assert_eq!(history.len(), 4);

        let contents: Vec<_> = history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, ["msg-2", "reply-2", "msg-3", "reply-3"]);
    }

    #[test]
    fn test_roles_alternate_after_truncation() {
        let mut history = ConversationHistory::new(1);
        fill(&mut history, 5);

        let roles: Vec<_> = history.iter().map(|t| t.role).collect();
        assert_eq!(roles, [TurnRole::User, TurnRole::Assistant]);
        assert_eq!(history.last().unwrap().content, "reply-5");
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let history = ConversationHistory::new(0);
        assert_eq!(history.max_history(), 1);
        assert_eq!(history.capacity(), 2);
    }

    #[test]
    fn test_clear() {
        let mut history = ConversationHistory::default();
        fill(&mut history, 4);
        history.clear();
        assert!(history.is_empty());
        assert!(history.to_messages().is_empty());
    }
}
