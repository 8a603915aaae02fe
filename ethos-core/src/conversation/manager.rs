//! Chat state for a front end
//!
//! Tracks the current selection and the displayed transcript, and replaces
//! the session whenever the personality or model changes.

use futures::StreamExt;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ConversationConfig;
use crate::error::Result;
use crate::llm::{GroqModel, LLMProvider};
use crate::personality::{PersonalityCatalog, PersonalityConfig};
use crate::transcript::Transcript;

use super::history::Turn;
use super::session::ConversationSession;
use super::stream::ResponseStream;

/// What the next session is created from
#[derive(Debug, Clone)]
pub struct Selection {
    pub personality: Arc<PersonalityConfig>,
    pub model: GroqModel,
    pub temperature: f32,
}

impl Selection {
    /// Select a personality at its default temperature
    pub fn new(personality: Arc<PersonalityConfig>, model: GroqModel) -> Self {
        Self {
            temperature: personality.temperature,
            personality,
            model,
        }
    }

    fn open(
        &self,
        provider: &Arc<dyn LLMProvider>,
        config: &ConversationConfig,
    ) -> ConversationSession {
        ConversationSession::new(
            Arc::clone(provider),
            Arc::clone(&self.personality),
            self.model,
            config,
        )
        .with_temperature(self.temperature)
    }
}

/// Owns the live session and everything shown to the user.
///
/// The session is created lazily from the current [`Selection`]. The
/// transcript survives personality and model changes; only `clear` empties
/// it.
pub struct SessionManager {
    catalog: PersonalityCatalog,
    provider: Arc<dyn LLMProvider>,
    config: ConversationConfig,
    selection: Selection,
    session: Option<ConversationSession>,
    transcript: Transcript,
}

impl SessionManager {
    /// # Errors
    ///
    /// Returns [`EthosError::UnknownPersonality`](crate::error::EthosError::UnknownPersonality)
    /// if `personality_id` is not in `catalog`.
    pub fn new(
        catalog: PersonalityCatalog,
        provider: Arc<dyn LLMProvider>,
        config: ConversationConfig,
        personality_id: &str,
        model: GroqModel,
    ) -> Result<Self> {
        let personality = catalog.require(personality_id)?;
        Ok(Self {
            selection: Selection::new(personality, model),
            catalog,
            provider,
            config,
            session: None,
            transcript: Transcript::new(),
        })
    }

    pub fn catalog(&self) -> &PersonalityCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn personality(&self) -> &Arc<PersonalityConfig> {
        &self.selection.personality
    }

    /// Switch personality, re-seeding the temperature from its default.
    ///
    /// Returns `true` if the session was replaced.
    pub fn select_personality(&mut self, id: &str) -> Result<bool> {
        if self.selection.personality.id == id {
            return Ok(false);
        }

        let personality = self.catalog.require(id)?;
        self.selection = Selection::new(personality, self.selection.model);
        self.replace_session("personality changed");
        Ok(true)
    }

    /// Switch model. Returns `true` if the session was replaced.
    pub fn select_model(&mut self, model: GroqModel) -> bool {
        if self.selection.model == model {
            return false;
        }

        self.selection.model = model;
        self.replace_session("model changed");
        true
    }

    /// Change the temperature in place; history is kept.
    ///
    /// Returns `false`, changing nothing, for a non-finite value.
    pub fn set_temperature(&mut self, temperature: f32) -> bool {
        if !temperature.is_finite() {
            return false;
        }
        self.selection.temperature = temperature.clamp(0.0, 1.0);
        if let Some(session) = self.session.as_mut() {
            session.set_temperature(temperature);
        }
        true
    }

    /// Start over: empty transcript, no session
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.session = None;
        tracing::debug!("Cleared chat");
    }

    /// The live session, if one has been created
    pub fn active_session(&self) -> Option<&ConversationSession> {
        self.session.as_ref()
    }

    /// The live session, created on first use
    pub fn session_mut(&mut self) -> &mut ConversationSession {
        let Self {
            selection,
            provider,
            config,
            session,
            ..
        } = self;
        session.get_or_insert_with(|| selection.open(provider, config))
    }

    /// Turns shown so far
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn export_transcript(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.transcript.export_to(dir)
    }

    /// Get the full reply, recording both turns in the transcript
    pub async fn send(&mut self, text: &str) -> String {
        self.transcript.push(Turn::user(text));
        let reply = self.session_mut().get_response(text).await;
        self.transcript.push(Turn::assistant(reply.clone()));
        reply
    }

    /// Stream the reply, recording what was shown once the stream ends.
    ///
    /// The user turn enters the transcript on the first poll. Dropping the
    /// stream after some output records the text shown so far.
    pub fn stream(&mut self, text: &str) -> ResponseStream<'_> {
        let Self {
            selection,
            provider,
            config,
            session,
            transcript,
            ..
        } = self;
        let session = session.get_or_insert_with(|| selection.open(provider, config));

        let relay = Relay {
            inner: session.stream_response(text),
            transcript,
            user: Some(Turn::user(text)),
            shown: String::new(),
            finished: false,
        };

        Box::pin(futures::stream::unfold(relay, |mut relay| async move {
            if let Some(user) = relay.user.take() {
                relay.transcript.push(user);
            }
            match relay.inner.next().await {
                Some(event) => {
                    relay.shown.push_str(&event.to_string());
                    Some((event, relay))
                }
                None => {
                    relay.finished = true;
                    None
                }
            }
        }))
    }

    fn replace_session(&mut self, reason: &str) {
        let previous = self.session.take().map(|s| s.id());
        tracing::info!(
            previous_session = ?previous,
            personality = %self.selection.personality.id,
            model = %self.selection.model,
            reason,
            "Replacing conversation session"
        );
    }
}

/// Forwards session events and writes the displayed reply on drop
struct Relay<'a> {
    inner: ResponseStream<'a>,
    transcript: &'a mut Transcript,
    user: Option<Turn>,
    shown: String,
    finished: bool,
}

impl Drop for Relay<'_> {
    fn drop(&mut self) {
        // never polled: nothing was shown
        if self.user.is_some() {
            return;
        }
        if self.finished || !self.shown.is_empty() {
            self.transcript
                .push(Turn::assistant(mem::take(&mut self.shown)));
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("selection", &self.selection)
            .field("session", &self.session)
            .field("messages", &self.transcript.len())
            .finish()
    }
}
