//! Plain-text rendering of conversation events and memory snapshots.

use duet_core::{ConversationEvent, MemoryStore};

/// Print one event as it arrives.
pub fn print_event(event: &ConversationEvent) {
    println!("{}", format_event(event));
}

pub fn format_event(event: &ConversationEvent) -> String {
    match event {
        ConversationEvent::TurnStarted { turn } => format!("\n## Conversation Turn {turn}"),
        ConversationEvent::Utterance { persona, text, .. } => {
            format!("[{persona}]\n{}\n", text.trim())
        }
        ConversationEvent::Failure { message, .. } => format!("[ERROR] {message}"),
        ConversationEvent::Summary { text } => {
            format!("\n## Conversation Summary\n{}", text.trim())
        }
    }
}

/// Entries oldest first, each with its current score.
pub fn format_memory(memory: &MemoryStore) -> String {
    if memory.is_empty() {
        return "[MEMORY] empty".to_string();
    }

    let mut out = format!("[MEMORY] {}/{} entries", memory.len(), memory.capacity());
    for (i, entry) in memory.scored_entries().iter().enumerate() {
        out.push_str(&format!("\n  {:>2}. ({:>3}) {}", i + 1, entry.score, preview(&entry.text, 80)));
    }
    out
}

pub fn format_weights(memory: &MemoryStore, n: usize) -> String {
    let top = memory.top_words(n);
    if top.is_empty() {
        return "[WEIGHTS] none yet".to_string();
    }

    let mut out = format!("[WEIGHTS] top {} of {} words", top.len(), memory.weights().len());
    for (word, count) in top {
        out.push_str(&format!("\n  {count:>4}  {word}"));
    }
    out
}

/// Single-line preview, cut at a char boundary.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_core::Persona;

    #[test]
    fn test_format_utterance() {
        let event = ConversationEvent::Utterance {
            turn: 1,
            persona: Persona::Second,
            text: "  Hello.  ".to_string(),
        };
        assert_eq!(format_event(&event), "[Agent 2]\nHello.\n");
    }

    #[test]
    fn test_format_memory() {
        let mut memory = MemoryStore::with_capacity(4);
        assert_eq!(format_memory(&memory), "[MEMORY] empty");
        memory.record_output("sun sun");
        memory.append("the sun");
        let out = format_memory(&memory);
        assert!(out.starts_with("[MEMORY] 1/4 entries"));
        assert!(out.contains("(  2) the sun"));
    }

    #[test]
    fn test_format_weights() {
        let mut memory = MemoryStore::new();
        assert_eq!(format_weights(&memory, 5), "[WEIGHTS] none yet");
        memory.record_output("a a b");
        let out = format_weights(&memory, 1);
        assert!(out.starts_with("[WEIGHTS] top 1 of 2 words"));
        assert!(out.contains("   2  a"));
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        assert_eq!(preview("héllo wörld", 5), "héllo...");
        assert_eq!(preview("short\nline", 80), "short line");
    }
}
