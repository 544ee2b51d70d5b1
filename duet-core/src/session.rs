//! Session state and conversation settings.
//!
//! A [`Session`] owns everything that survives between conversations: the
//! shared memory and its word weights. The driver borrows it mutably for the
//! duration of a run.

use crate::memory::{MemoryStore, DEFAULT_CAPACITY, DEFAULT_CONTEXT_WINDOW};
use crate::prompts::ConversationType;
use groq::Model;

/// Fewest turns a conversation may run.
pub const MIN_TURNS: usize = 1;

/// Most turns a conversation may run.
pub const MAX_TURNS: usize = 100;

/// Output budget for each persona reply.
pub const TURN_MAX_TOKENS: usize = 550;

/// Output budget for the closing summary.
pub const SUMMARY_MAX_TOKENS: usize = 1000;

/// Settings for one conversation run.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model identifier sent with every completion.
    pub model: String,

    /// Style of exchange the first persona leads.
    pub conversation_type: ConversationType,

    /// Number of turn pairs; only settable through the clamping setters.
    turns: usize,

    /// Maximum tokens per persona reply.
    pub turn_max_tokens: usize,

    /// Maximum tokens for the summary.
    pub summary_max_tokens: usize,

    /// Shared memory capacity for sessions built from this config.
    pub capacity: usize,

    /// Entries surfaced as prompt context.
    pub context_window: usize,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            model: Model::default().id().to_string(),
            conversation_type: ConversationType::default(),
            turns: 5,
            turn_max_tokens: TURN_MAX_TOKENS,
            summary_max_tokens: SUMMARY_MAX_TOKENS,
            capacity: DEFAULT_CAPACITY,
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the conversation type.
    pub fn with_conversation_type(mut self, kind: ConversationType) -> Self {
        self.conversation_type = kind;
        self
    }

    /// Set the number of turns, clamped to `MIN_TURNS..=MAX_TURNS`.
    pub fn with_turns(mut self, turns: usize) -> Self {
        self.set_turns(turns);
        self
    }

    /// Number of turns, always within `MIN_TURNS..=MAX_TURNS`.
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn set_turns(&mut self, turns: usize) {
        self.turns = turns.clamp(MIN_TURNS, MAX_TURNS);
    }

    /// Set max tokens for each persona reply.
    pub fn with_turn_max_tokens(mut self, tokens: usize) -> Self {
        self.turn_max_tokens = tokens;
        self
    }

    /// Set max tokens for the summary.
    pub fn with_summary_max_tokens(mut self, tokens: usize) -> Self {
        self.summary_max_tokens = tokens;
        self
    }

    /// Set the shared memory capacity (zero is treated as one).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set how many entries are surfaced as prompt context.
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared by every conversation in one user session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    memory: MemoryStore,
}

impl Session {
    /// Create an empty session with default memory limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with a custom memory capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            memory: MemoryStore::with_capacity(capacity),
        }
    }

    /// Create an empty session with the memory limits from `config`.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            memory: MemoryStore::with_capacity(config.capacity)
                .with_context_window(config.context_window),
        }
    }

    /// Add a user thought to shared memory, exactly as given.
    ///
    /// Returns `false` (and stores nothing) for blank input. User thoughts
    /// do not feed the word weights; only persona output does.
    pub fn add_thought(&mut self, thought: &str) -> bool {
        if thought.trim().is_empty() {
            return false;
        }
        self.memory.append(thought);
        true
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryStore {
        &mut self.memory
    }

    /// Return to the empty state, keeping memory limits.
    pub fn reset(&mut self) {
        self.memory.reset();
    }
}
