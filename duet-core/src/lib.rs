//! Two personas talking over a shared, weighted memory.
//!
//! This crate provides:
//! - A bounded FIFO memory of utterances with per-word weights
//! - Prompt templates keyed by conversation type
//! - A driver that alternates two personas over a chat-completion backend
//!   and closes with a summary
//!
//! # Quick Start
//!
//! ```ignore
//! use duet_core::{ConversationType, Driver, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = groq::Groq::from_env()?;
//!     let config = SessionConfig::new()
//!         .with_conversation_type(ConversationType::Debate)
//!         .with_turns(3);
//!
//!     let mut session = Session::new();
//!     session.add_thought("Is mathematics discovered or invented?");
//!
//!     let mut driver = Driver::new(client, config);
//!     let report = driver.run(&mut session, |event| println!("{event:?}")).await;
//!     println!("{}", report.summary.unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod driver;
pub mod memory;
pub mod prompts;
pub mod session;
pub mod testing;

pub use backend::{ChatBackend, CompletionError};
pub use driver::{ConversationEvent, ConversationReport, Driver, DriverState, Persona, Stage};
pub use memory::{MemoryStore, ScoredEntry};
pub use prompts::{ConversationType, UnknownConversationType};
pub use session::{Session, SessionConfig};
pub use testing::{ScriptedBackend, ScriptedReply};
