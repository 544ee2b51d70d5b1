//! Prompt templates for the two personas and the closing summary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CONTEXT_PREAMBLE: &str = "Consider the following context from shared memory:";

const OPENING_CLOSER: &str = "Your response should be thought-provoking, build upon the previous discussion, introduce novel ideas, and encourage critical thinking. Keep it concise yet profound.";

const REFLECTION_LEAD: &str = "Reflect on Agent 1's response and the previously discussed topics. Compose a thoughtful short response that builds upon the conversation, offering new insights or posing intriguing questions.";

const REFLECTION_CLOSER: &str = "Your response should enrich the conversation, challenge assumptions, and stimulate further dialogue. Keep it concise yet impactful.";

/// Unrecognised conversation type label.
#[derive(Debug, Error)]
#[error("unknown conversation type: {0}")]
pub struct UnknownConversationType(pub String);

/// The style of exchange the first persona is asked to lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversationType {
    #[default]
    CasualChat,
    Debate,
    Brainstorming,
    Teaching,
    Storytelling,
    Interview,
    RolePlay,
    PanelDiscussion,
    DeepInsights,
}

impl ConversationType {
    pub const ALL: [ConversationType; 9] = [
        ConversationType::CasualChat,
        ConversationType::Debate,
        ConversationType::Brainstorming,
        ConversationType::Teaching,
        ConversationType::Storytelling,
        ConversationType::Interview,
        ConversationType::RolePlay,
        ConversationType::PanelDiscussion,
        ConversationType::DeepInsights,
    ];

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            ConversationType::CasualChat => "Casual Chat",
            ConversationType::Debate => "Debate",
            ConversationType::Brainstorming => "Brainstorming Session",
            ConversationType::Teaching => "Teaching Session",
            ConversationType::Storytelling => "Storytelling",
            ConversationType::Interview => "Interview",
            ConversationType::RolePlay => "Role-playing",
            ConversationType::PanelDiscussion => "Panel Discussion",
            ConversationType::DeepInsights => "Deep insights",
        }
    }

    /// Short command-line name.
    pub fn slug(&self) -> &'static str {
        match self {
            ConversationType::CasualChat => "casual-chat",
            ConversationType::Debate => "debate",
            ConversationType::Brainstorming => "brainstorming",
            ConversationType::Teaching => "teaching",
            ConversationType::Storytelling => "storytelling",
            ConversationType::Interview => "interview",
            ConversationType::RolePlay => "role-play",
            ConversationType::PanelDiscussion => "panel-discussion",
            ConversationType::DeepInsights => "deep-insights",
        }
    }

    /// The fixed instruction for this type. `None` for DeepInsights, which
    /// uses the reflective template instead.
    fn instruction(&self) -> Option<&'static str> {
        Some(match self {
            ConversationType::CasualChat => "Engage in a casual conversation by sharing an interesting fact or expressing a personal opinion.",
            ConversationType::Debate => "Participate in a debate by presenting a well-researched argument on a controversial topic.",
            ConversationType::Brainstorming => "Contribute to a brainstorming session by proposing a creative solution to a problem or exploring potential ideas for a project.",
            ConversationType::Teaching => "Contribute to a teaching session by explaining a complex concept in a simple and understandable manner.",
            ConversationType::Storytelling => "Participate in a storytelling session by crafting a captivating narrative that engages the listener and leaves them with a thought-provoking message.",
            ConversationType::Interview => "Participate in an interview by asking insightful questions that reveal interesting facts or perspectives about a person or topic.",
            ConversationType::RolePlay => "Participate in a role-playing session by assuming a character and engaging in a scenario that explores their thoughts, feelings, and actions.",
            ConversationType::PanelDiscussion => "Participate in a panel discussion by presenting a topic and sharing your unique perspective and insights.",
            ConversationType::DeepInsights => return None,
        })
    }

    /// The type-specific part of the opening prompt, before any other
    /// persona's output or the closing instruction.
    pub fn template(&self, context: &str) -> String {
        match self.instruction() {
            Some(instruction) => format!("{CONTEXT_PREAMBLE}\n\n{context}\n\n{instruction}"),
            None => format!("{REFLECTION_LEAD} {CONTEXT_PREAMBLE}\n\n{context}\n\n{REFLECTION_CLOSER}"),
        }
    }
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConversationType {
    type Err = UnknownConversationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ConversationType::ALL
            .into_iter()
            .find(|kind| {
                kind.label().eq_ignore_ascii_case(wanted) || kind.slug().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownConversationType(s.to_string()))
    }
}

/// Prompt for the persona that opens each turn.
///
/// `other_output` is the second persona's latest reply; it is embedded only
/// when non-empty, which is the case from the second turn on.
pub fn opening_prompt(kind: ConversationType, context: &str, other_output: &str) -> String {
    let mut prompt = kind.template(context);
    if !other_output.is_empty() {
        prompt.push_str(&format!("\n\nAgent 2's previous response: {other_output}\n\n"));
    }
    prompt.push_str("\n\n");
    prompt.push_str(OPENING_CLOSER);
    prompt
}

/// Prompt for the persona that answers each turn.
pub fn responder_prompt(context: &str, other_output: &str) -> String {
    format!(
        "{REFLECTION_LEAD} {CONTEXT_PREAMBLE}\n\n{context}\n\nAgent 1's previous response: {other_output}\n\n{REFLECTION_CLOSER}"
    )
}

/// Prompt asking for a summary of the whole transcript.
pub fn summary_prompt(transcript: &str) -> String {
    format!(
        r#"Based on the following conversation history, provide a structured, insightful, and long summary that captures the key points, any significant conclusions or questions raised:

{transcript}

Your summary should be detailed and organized, reflecting the main ideas and insights from the conversation."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_distinct_template() {
        let templates: std::collections::HashSet<String> = ConversationType::ALL
            .iter()
            .map(|k| k.template("CTX"))
            .collect();
        assert_eq!(templates.len(), ConversationType::ALL.len());
        for kind in ConversationType::ALL {
            assert!(kind.template("CTX").contains("CTX"), "{kind} drops the context");
        }
    }

    #[test]
    fn test_parse_labels_and_slugs() {
        for kind in ConversationType::ALL {
            assert_eq!(kind.label().parse::<ConversationType>().unwrap(), kind);
            assert_eq!(kind.slug().parse::<ConversationType>().unwrap(), kind);
        }
        assert_eq!(
            "DEBATE".parse::<ConversationType>().unwrap(),
            ConversationType::Debate
        );
        assert!("karaoke".parse::<ConversationType>().is_err());
    }

    #[test]
    fn test_opening_prompt_first_turn() {
        let prompt = opening_prompt(ConversationType::Debate, "rust is fun", "");
        assert!(prompt.starts_with(
            "Consider the following context from shared memory:\n\nrust is fun\n\nParticipate in a debate"
        ));
        assert!(!prompt.contains("Agent 2's previous response"));
        assert!(prompt.ends_with("Keep it concise yet profound."));
    }

    #[test]
    fn test_opening_prompt_embeds_other_persona() {
        let prompt = opening_prompt(ConversationType::CasualChat, "ctx", "I disagree.");
        assert!(prompt.contains("\n\nAgent 2's previous response: I disagree.\n\n"));
        assert!(prompt.ends_with(OPENING_CLOSER));
    }

    #[test]
    fn test_deep_insights_uses_reflection() {
        let prompt = opening_prompt(ConversationType::DeepInsights, "ctx", "");
        assert!(prompt.starts_with("Reflect on Agent 1's response"));
        assert!(prompt.contains("ctx"));
    }

    #[test]
    fn test_responder_prompt() {
        let prompt = responder_prompt("ctx", "Here is my point.");
        assert!(prompt.contains("shared memory:\n\nctx\n\n"));
        assert!(prompt.contains("Agent 1's previous response: Here is my point.\n\n"));
        assert!(prompt.ends_with("Keep it concise yet impactful."));
    }

    #[test]
    fn test_summary_prompt_embeds_transcript() {
        let prompt = summary_prompt("Agent 1: hi\n\nAgent 2: hello\n\n");
        assert!(prompt.starts_with("Based on the following conversation history"));
        assert!(prompt.contains("Agent 1: hi\n\nAgent 2: hello"));
    }

    #[test]
    fn test_serde_slug() {
        let json = serde_json::to_string(&ConversationType::PanelDiscussion).unwrap();
        assert_eq!(json, "\"panel-discussion\"");
        let back: ConversationType = serde_json::from_str("\"role-play\"").unwrap();
        assert_eq!(back, ConversationType::RolePlay);
    }
}
