//! Streamed replies

use futures::{Stream, StreamExt};
use std::fmt;
use std::mem;
use std::pin::Pin;

use crate::error::EthosError;
use crate::llm::{LLMRequest, TokenStream};

use super::history::Turn;
use super::session::ConversationSession;

/// Lazy, finite, non-restartable stream of reply events.
///
/// Holds the session's mutable borrow until dropped.
pub type ResponseStream<'a> = Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>;

/// One item of a streamed reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A fragment of the reply, in arrival order
    Token(String),
    /// The provider failed; always the last event
    Error(String),
}

impl StreamEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, StreamEvent::Error(_))
    }

    /// Fragment text, if this is a token
    pub fn token(&self) -> Option<&str> {
        match self {
            StreamEvent::Token(text) => Some(text),
            StreamEvent::Error(_) => None,
        }
    }
}

/// Display form is what a chat view shows inline: the fragment itself, or
/// the error marker.
impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEvent::Token(text) => f.write_str(text),
            StreamEvent::Error(message) => write!(f, "⚠️ Error: {}", message),
        }
    }
}

struct StreamState<'a> {
    session: &'a mut ConversationSession,
    user: Option<Turn>,
    request: Option<LLMRequest>,
    inner: Option<TokenStream>,
    reply: String,
    fragments: usize,
    finished: bool,
}

pub(super) fn open(session: &mut ConversationSession, user: Turn) -> ResponseStream<'_> {
    let request = session.build_request(&user.content);
    let state = StreamState {
        session,
        user: Some(user),
        request: Some(request),
        inner: None,
        reply: String::new(),
        fragments: 0,
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |state| state.advance()))
}

impl<'a> StreamState<'a> {
    async fn advance(mut self) -> Option<(StreamEvent, Self)> {
        if self.finished {
            return None;
        }

        if self.inner.is_none() {
            let request = self.request.take()?;
            let provider = self.session.provider();
            match provider.generate_stream(&request).await {
                Ok(inner) => self.inner = Some(inner),
                Err(e) => return Some(self.fail(e)),
            }
        }

        let next = self.inner.as_mut()?.next().await;
        match next {
            Some(Ok(token)) => {
                self.reply.push_str(&token);
                self.fragments += 1;
                Some((StreamEvent::Token(token), self))
            }
            Some(Err(e)) => Some(self.fail(e)),
            None => {
                self.complete();
                None
            }
        }
    }

    fn complete(&mut self) {
        self.finished = true;
        if let Some(user) = self.user.take() {
            let reply = mem::take(&mut self.reply);
            self.session.record_exchange(user, Turn::assistant(reply));
        }
    }

    fn fail(mut self, error: EthosError) -> (StreamEvent, Self) {
        self.finished = true;
        self.inner = None;

        tracing::warn!(
            session_id = %self.session.id(),
            fragments = self.fragments,
            error = %error,
            "Streaming reply failed"
        );

        if self.session.keeps_partial_replies() && self.fragments > 0 {
            if let Some(user) = self.user.take() {
                let partial = mem::take(&mut self.reply);
                self.session.record_exchange(user, Turn::assistant(partial));
            }
        }

        (StreamEvent::Error(error.to_string()), self)
    }
}
