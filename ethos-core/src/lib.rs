//! # Ethos - Personality-Driven Chat
//!
//! Ethos runs multi-turn conversations against hosted chat-completion APIs,
//! each shaped by a personality preset:
//! - Built-in personality catalog (system prompt, temperature, display metadata)
//! - Bounded conversation history, oldest exchanges dropped first
//! - Blocking and token-by-token streaming replies
//! - Groq provider over the OpenAI-compatible wire format
//! - Plain-text transcript export
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ethos_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let provider = Arc::new(GroqProvider::from_env(None::<String>)?);
//!     let personality = PersonalityCatalog::builtin().require("witty_intellectual")?;
//!
//!     let mut session = ConversationSession::new(
//!         provider,
//!         personality,
//!         GroqModel::default(),
//!         &ConversationConfig::default(),
//!     );
//!
//!     let reply = session.get_response("Explain entropy").await;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod personality;
pub mod transcript;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConversationConfig, EthosConfig, LlmConfig};
    pub use crate::conversation::{
        ConversationHistory, ConversationSession, ResponseStream, SessionManager, StreamEvent,
        Turn, TurnRole,
    };
    pub use crate::error::{EthosError, Result};
    pub use crate::llm::providers::GroqProvider;
    pub use crate::llm::{
        GroqModel, LLMProvider, LLMRequest, LLMResponse, Message, MessageRole,
    };
    pub use crate::personality::{PersonalityCatalog, PersonalityConfig};
    pub use crate::transcript::Transcript;
}
