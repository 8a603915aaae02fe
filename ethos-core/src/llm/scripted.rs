//! Deterministic provider for offline testing
//!
//! Replays a queue of predetermined replies and records every request it
//! receives so tests can assert on the assembled message list.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{EthosError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, ModelInfo, TokenStream};

/// Predetermined outcome for one provider call
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Full reply, streamed as a single fragment
    Text(String),
    /// Reply streamed fragment by fragment
    Tokens(Vec<String>),
    /// Fragments followed by a mid-stream failure
    TokensThenError(Vec<String>, String),
    /// The call fails before producing anything
    Fail(String),
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        ScriptedReply::Text(text.into())
    }

    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedReply::Tokens(tokens.into_iter().map(Into::into).collect())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ScriptedReply::Fail(message.into())
    }
}

/// Provider replaying scripted replies in order
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a queue of replies
    pub fn with_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append a reply to the queue
    pub fn push(&self, reply: ScriptedReply) {
        lock(&self.replies).push_back(reply);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<LLMRequest> {
        lock(&self.requests).clone()
    }

    /// Number of replies not yet consumed
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }

    fn next_reply(&self, request: &LLMRequest) -> Result<ScriptedReply> {
        lock(&self.requests).push(request.clone());
        lock(&self.replies)
            .pop_front()
            .ok_or_else(|| EthosError::Other("scripted provider has no replies left".to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        match self.next_reply(request)? {
            ScriptedReply::Text(content) => Ok(LLMResponse {
                content,
                usage: None,
            }),
            ScriptedReply::Tokens(tokens) => Ok(LLMResponse {
                content: tokens.concat(),
                usage: None,
            }),
            ScriptedReply::TokensThenError(_, message) => Err(EthosError::Stream(message)),
            ScriptedReply::Fail(message) => Err(EthosError::Api {
                status: 503,
                message,
            }),
        }
    }

    async fn generate_stream(&self, request: &LLMRequest) -> Result<TokenStream> {
        let items: Vec<Result<String>> = match self.next_reply(request)? {
            ScriptedReply::Text(content) => vec![Ok(content)],
            ScriptedReply::Tokens(tokens) => tokens.into_iter().map(Ok).collect(),
            ScriptedReply::TokensThenError(tokens, message) => tokens
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(EthosError::Stream(message))))
                .collect(),
            ScriptedReply::Fail(message) => {
                return Err(EthosError::Api {
                    status: 503,
                    message,
                });
            }
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "scripted".to_string(),
            model_name: "scripted".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_replies_in_order() {
        let provider = ScriptedProvider::with_replies([
            ScriptedReply::text("first"),
            ScriptedReply::tokens(["se", "cond"]),
        ]);
        let request = LLMRequest::new(Vec::new());

        assert_eq!(provider.generate_request(&request).await.unwrap().content, "first");
        assert_eq!(provider.generate_request(&request).await.unwrap().content, "second");
        assert!(provider.generate_request(&request).await.is_err());
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_stream_then_error() {
        let provider = ScriptedProvider::with_replies([ScriptedReply::TokensThenError(
            vec!["a".to_string()],
            "boom".to_string(),
        )]);

        let items: Vec<_> = provider
            .generate_stream(&LLMRequest::new(Vec::new()))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(EthosError::Stream(_))));
    }
}
