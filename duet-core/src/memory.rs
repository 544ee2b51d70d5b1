//! Shared memory for the two personas.
//!
//! A bounded FIFO log of utterances plus a running word-frequency table.
//! The frequencies rank entries when choosing which ones to surface as
//! prompt context.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Default number of entries kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 20;

/// Default number of entries surfaced by [`MemoryStore::weighted_context`].
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Bounded shared memory with dynamic word weights.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: VecDeque<String>,
    weights: HashMap<String, u64>,
    capacity: usize,
    context_window: usize,
}

impl MemoryStore {
    /// Create an empty store with the default capacity and context window.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty store holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one so the newest entry is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            weights: HashMap::new(),
            capacity,
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }

    /// Set how many entries [`weighted_context`](Self::weighted_context) returns.
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    /// Append an entry, evicting the oldest one first when the store is full.
    pub fn append(&mut self, entry: impl Into<String>) {
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::trace!(evicted_len = evicted.len(), "evicted oldest memory entry");
            }
        }
        self.entries.push_back(entry.into());
    }

    /// Bump the weight of every whitespace-separated word in `text`.
    pub fn record_output(&mut self, text: &str) {
        for word in text.split_whitespace() {
            *self.weights.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    /// Sum of the weights of the entry's words; unknown words count zero.
    pub fn score(&self, entry: &str) -> u64 {
        entry
            .split_whitespace()
            .map(|word| self.weight(word))
            .sum()
    }

    /// Build the context string surfaced to the personas.
    ///
    /// Entries are sorted by score, highest first (ties keep insertion
    /// order), and the *last* `context_window` of that ordering are joined
    /// with spaces. This surfaces the lowest-scoring entries, which is the
    /// long-standing behavior of the demo and is kept as is.
    pub fn weighted_context(&self) -> String {
        let mut scored: Vec<(&str, u64)> = self
            .entries
            .iter()
            .map(|e| (e.as_str(), self.score(e)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let start = scored.len().saturating_sub(self.context_window);
        scored[start..]
            .iter()
            .map(|(entry, _)| *entry)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Entries oldest to newest.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    /// Entries paired with their current score, oldest to newest.
    pub fn scored_entries(&self) -> Vec<ScoredEntry> {
        self.entries
            .iter()
            .map(|e| ScoredEntry {
                text: e.clone(),
                score: self.score(e),
            })
            .collect()
    }

    /// Current weight of a word.
    pub fn weight(&self, word: &str) -> u64 {
        self.weights.get(word).copied().unwrap_or(0)
    }

    /// The full weight table.
    pub fn weights(&self) -> &HashMap<String, u64> {
        &self.weights
    }

    /// The `n` heaviest words, ties broken alphabetically.
    pub fn top_words(&self, n: usize) -> Vec<(&str, u64)> {
        let mut words: Vec<(&str, u64)> = self
            .weights
            .iter()
            .map(|(w, c)| (w.as_str(), *c))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        words.truncate(n);
        words
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    /// Forget all entries and weights, keeping capacity and window.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.weights.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A memory entry with its score at the time of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredEntry {
    pub text: String,
    pub score: u64,
}
