//! Conversation driver.
//!
//! Runs the turn loop: each turn the first persona opens with a prompt built
//! from the conversation type, the second persona reflects on it, and both
//! replies are written back into shared memory. A summary of the transcript
//! is requested once the loop ends.

use crate::backend::{non_empty, ChatBackend, CompletionError};
use crate::prompts::{opening_prompt, responder_prompt, summary_prompt};
use crate::session::{Session, SessionConfig};
use groq::Message;
use serde::Serialize;
use std::fmt;

/// One of the two conversation participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Opens each turn using the conversation-type template.
    First,
    /// Answers the first persona.
    Second,
}

impl Persona {
    pub const BOTH: [Persona; 2] = [Persona::First, Persona::Second];

    /// Name used in prompts and the transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Persona::First => "Agent 1",
            Persona::Second => "Agent 2",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the driver is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    Idle,
    Running { turn: usize },
    Summarizing,
    Done,
    /// A persona reply failed; no further turns were issued.
    Aborted,
}

/// Which call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "persona", rename_all = "snake_case")]
pub enum Stage {
    Turn(Persona),
    Summary,
}

/// Progress reported to the caller while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    TurnStarted {
        turn: usize,
    },
    Utterance {
        turn: usize,
        persona: Persona,
        text: String,
    },
    Failure {
        stage: Stage,
        message: String,
    },
    Summary {
        text: String,
    },
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationReport {
    /// Final state, `Done` or `Aborted`.
    pub state: DriverState,
    /// Turns in which both personas replied.
    pub turns_completed: usize,
    /// `"Agent N: text\n\n"` for every successful reply, in order.
    pub transcript: String,
    pub summary: Option<String>,
    /// Message of the failure that aborted the loop or the summary.
    pub failure: Option<String>,
}

impl ConversationReport {
    fn new() -> Self {
        Self {
            state: DriverState::Idle,
            turns_completed: 0,
            transcript: String::new(),
            summary: None,
            failure: None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.state == DriverState::Aborted
    }
}

/// Drives two personas through a conversation over a [`ChatBackend`].
pub struct Driver<B> {
    backend: B,
    config: SessionConfig,
    state: DriverState,
}

impl<B: ChatBackend> Driver<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            state: DriverState::Idle,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mutable settings; changes apply to the next run.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run a full conversation against `session`.
    ///
    /// Events are handed to `on_event` as they happen. Failures never
    /// propagate: they end the loop, are reported through the event stream
    /// and the returned report, and leave everything already written to
    /// memory in place.
    pub async fn run<F>(&mut self, session: &mut Session, mut on_event: F) -> ConversationReport
    where
        F: FnMut(&ConversationEvent),
    {
        let kind = self.config.conversation_type;
        let mut report = ConversationReport::new();
        let mut latest = [String::new(), String::new()];

        tracing::info!(
            model = %self.config.model,
            kind = kind.slug(),
            turns = self.config.turns(),
            "starting conversation"
        );

        'turns: for turn in 1..=self.config.turns() {
            self.state = DriverState::Running { turn };
            on_event(&ConversationEvent::TurnStarted { turn });

            for persona in Persona::BOTH {
                let context = session.memory().weighted_context();
                let prompt = match persona {
                    Persona::First => opening_prompt(kind, &context, &latest[1]),
                    Persona::Second => responder_prompt(&context, &latest[0]),
                };

                match self.ask(prompt, self.config.turn_max_tokens).await {
                    Ok(text) => {
                        tracing::debug!(turn, persona = persona.label(), len = text.len(), "persona replied");
                        on_event(&ConversationEvent::Utterance {
                            turn,
                            persona,
                            text: text.clone(),
                        });
                        report.transcript.push_str(&format!("{persona}: {text}\n\n"));

                        let memory = session.memory_mut();
                        memory.append(text.as_str());
                        memory.record_output(&text);

                        latest[persona as usize] = text;
                    }
                    Err(e) => {
                        tracing::warn!(turn, persona = persona.label(), error = %e, "aborting conversation");
                        let message = format!("No response received from {persona}: {e}");
                        on_event(&ConversationEvent::Failure {
                            stage: Stage::Turn(persona),
                            message: message.clone(),
                        });
                        report.failure = Some(message);
                        self.state = DriverState::Aborted;
                        break 'turns;
                    }
                }
            }

            report.turns_completed = turn;
        }

        let final_state = if self.state == DriverState::Aborted {
            DriverState::Aborted
        } else {
            DriverState::Done
        };

        if !report.transcript.is_empty() {
            self.state = DriverState::Summarizing;
            let prompt = summary_prompt(&report.transcript);
            match self.ask(prompt, self.config.summary_max_tokens).await {
                Ok(summary) => {
                    on_event(&ConversationEvent::Summary {
                        text: summary.clone(),
                    });
                    report.summary = Some(summary);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "summary failed");
                    let message = format!("Summary failed: {e}");
                    on_event(&ConversationEvent::Failure {
                        stage: Stage::Summary,
                        message: message.clone(),
                    });
                    report.failure.get_or_insert(message);
                }
            }
        }

        self.state = final_state;
        report.state = final_state;
        tracing::info!(
            turns_completed = report.turns_completed,
            aborted = report.is_aborted(),
            "conversation finished"
        );
        report
    }

    async fn ask(&self, prompt: String, max_tokens: usize) -> Result<String, CompletionError> {
        let text = self
            .backend
            .complete(&self.config.model, vec![Message::system(prompt)], max_tokens)
            .await?;
        non_empty(text)
    }
}
