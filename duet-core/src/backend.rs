//! The chat-completion boundary.
//!
//! The driver only needs "send these messages, get text back". Keeping that
//! behind a trait lets the conversation run against Groq in production and
//! against scripted replies in tests.

use async_trait::async_trait;
use groq::{Groq, Message, Request};
use thiserror::Error;

/// A completion call failed.
///
/// Transport, authentication and decoding problems all collapse into this
/// one kind; an empty reply counts as a failure too.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion call failed: {0}")]
    Api(#[from] groq::Error),

    #[error("completion call returned no content")]
    Empty,

    #[error("completion call failed: {0}")]
    Other(String),
}

/// Something that can answer a chat-completion request.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generate text for `messages` with `model`, capped at `max_tokens`.
    async fn complete(
        &self,
        model: &str,
        messages: Vec<Message>,
        max_tokens: usize,
    ) -> Result<String, CompletionError>;
}

#[async_trait]
impl ChatBackend for Groq {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<Message>,
        max_tokens: usize,
    ) -> Result<String, CompletionError> {
        let request = Request::new(messages)
            .with_model(model)
            .with_max_tokens(max_tokens);
        let response = Groq::complete(self, request).await?;
        Ok(response.text())
    }
}

/// Treat empty replies as failures. Whitespace-only text is still a reply.
pub(crate) fn non_empty(text: String) -> Result<String, CompletionError> {
    if text.is_empty() {
        Err(CompletionError::Empty)
    } else {
        Ok(text)
    }
}
