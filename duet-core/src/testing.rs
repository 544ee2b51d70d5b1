//! Testing utilities.
//!
//! [`ScriptedBackend`] stands in for the completion API so conversations can
//! be driven deterministically without network access.

use crate::backend::{ChatBackend, CompletionError};
use async_trait::async_trait;
use groq::Message;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A scripted answer to the next completion call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this text.
    Text(String),
    /// Fail with this message.
    Fail(String),
    /// Return an empty body.
    Empty,
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        ScriptedReply::Text(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ScriptedReply::Fail(message.into())
    }
}

/// A completion request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: usize,
}

impl RecordedRequest {
    /// Content of the first message, which is the whole prompt for driver calls.
    pub fn prompt(&self) -> &str {
        self.messages.first().map(|m| m.content.as_str()).unwrap_or("")
    }
}

/// A backend that replays scripted replies in order and records requests.
///
/// Once the script runs out every call fails.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script that answers with each of `texts` in turn.
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| ScriptedReply::Text(t.into())))
    }

    /// Queue another reply.
    pub fn push(&self, reply: ScriptedReply) {
        lock(&self.replies).push_back(reply);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<Message>,
        max_tokens: usize,
    ) -> Result<String, CompletionError> {
        lock(&self.requests).push(RecordedRequest {
            model: model.to_string(),
            messages,
            max_tokens,
        });

        match lock(&self.replies).pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Empty) => Ok(String::new()),
            Some(ScriptedReply::Fail(message)) => Err(CompletionError::Other(message)),
            None => Err(CompletionError::Other("no scripted replies left".to_string())),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
