//! Conversation Session Management
//!
//! Multi-turn chat against one personality and model, with a bounded
//! history shared by the blocking and streaming reply paths.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ethos_core::config::ConversationConfig;
//! use ethos_core::conversation::ConversationSession;
//! use ethos_core::llm::{GroqModel, ScriptedProvider, ScriptedReply};
//! use ethos_core::personality::PersonalityCatalog;
//!
//! # async fn run() {
//! let provider = Arc::new(ScriptedProvider::with_replies([ScriptedReply::text("Hi!")]));
//! let personality = PersonalityCatalog::builtin()["friendly_companion"].clone();
//!
//! let mut session = ConversationSession::new(
//!     provider,
//!     Arc::new(personality),
//!     GroqModel::default(),
//!     &ConversationConfig::default(),
//! );
//! let reply = session.get_response("Hello!").await;
//! assert_eq!(reply, "Hi!");
//! # }
//! ```

mod history;
mod manager;
mod session;
mod stream;

pub use history::{ConversationHistory, Turn, TurnRole};
pub use manager::{Selection, SessionManager};
pub use session::ConversationSession;
pub use stream::{ResponseStream, StreamEvent};
