//! Duet - watch two AI personas talk over a shared memory.
//!
//! # One-shot mode
//!
//! ```bash
//! cargo run -p duet -- run --thought "Is time travel possible?" --kind debate --turns 3
//! ```
//!
//! # Interactive mode
//!
//! ```bash
//! cargo run -p duet -- shell --kind brainstorming
//! ```

mod render;
mod shell;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use duet_core::session::{MAX_TURNS, MIN_TURNS};
use duet_core::{ConversationType, Driver, Session, SessionConfig};
use groq::{Groq, Model};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "duet")]
#[command(version)]
#[command(about = "Two AI personas in conversation over a weighted shared memory")]
struct Cli {
    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single conversation and exit
    Run {
        #[command(flatten)]
        settings: Settings,

        /// Initial thought added to shared memory before the first turn
        #[arg(short, long)]
        thought: Option<String>,

        /// Print the final report as JSON instead of the live transcript
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: add thoughts, start conversations, inspect memory
    Shell {
        #[command(flatten)]
        settings: Settings,
    },

    /// List the conversation types
    Kinds,

    /// List the available models
    Models,
}

#[derive(Args, Clone)]
struct Settings {
    /// Model: fast, smart, or a model id
    #[arg(short, long, default_value = "smart")]
    model: String,

    /// Conversation type (e.g. casual-chat, debate, deep-insights)
    #[arg(short, long, default_value = "casual-chat")]
    kind: ConversationType,

    /// Number of conversation turns
    #[arg(short = 'n', long, default_value_t = 5,
          value_parser = clap::value_parser!(u16).range(MIN_TURNS as i64..=MAX_TURNS as i64))]
    turns: u16,

    /// Shared memory capacity
    #[arg(long, default_value_t = duet_core::memory::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Memory entries surfaced to the personas as context
    #[arg(long, default_value_t = duet_core::memory::DEFAULT_CONTEXT_WINDOW)]
    context_window: usize,
}

impl Settings {
    fn session_config(&self) -> SessionConfig {
        SessionConfig::new()
            .with_model(resolve_model(&self.model))
            .with_conversation_type(self.kind)
            .with_turns(usize::from(self.turns))
            .with_capacity(self.capacity)
            .with_context_window(self.context_window)
    }
}

/// Known model names map to their ids; anything else is passed through.
pub(crate) fn resolve_model(name: &str) -> String {
    name.parse::<Model>()
        .map(|m| m.id().to_string())
        .unwrap_or_else(|_| name.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("duet={log_level},duet_core={log_level},groq={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Kinds => {
            for kind in ConversationType::ALL {
                println!("{:<18} {}", kind.slug(), kind.label());
            }
        }
        Commands::Models => {
            for model in Model::ALL {
                let marker = if model == Model::default() { " (default)" } else { "" };
                println!("{}{marker}", model.label());
            }
        }
        Commands::Run {
            settings,
            thought,
            json,
        } => {
            let client = client(cli.api_key)?;
            return run_once(client, &settings, thought.as_deref(), json).await;
        }
        Commands::Shell { settings } => {
            let client = client(cli.api_key)?;
            let config = settings.session_config();
            let session = Session::from_config(&config);
            shell::run_shell(Driver::new(client, config), session).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Without a key the conversation actions stay disabled.
fn client(api_key: Option<String>) -> Result<Groq> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(Groq::new(key)),
        _ => bail!(
            "GROQ_API_KEY is not set. Get a key at https://console.groq.com/keys and \
             set it in .env, export it, or pass --api-key"
        ),
    }
}

/// Exit status 2 signals an aborted conversation.
async fn run_once(
    client: Groq,
    settings: &Settings,
    thought: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    let config = settings.session_config();
    let mut session = Session::from_config(&config);
    let mut driver = Driver::new(client, config);

    match thought {
        Some(t) if session.add_thought(t) => {
            if !json {
                println!("[MEMORY] Initial thought added to shared memory.");
            }
        }
        _ => eprintln!("[WARN] No initial thought given; the personas start from an empty memory."),
    }

    let report = if json {
        driver.run(&mut session, |_| {}).await
    } else {
        driver.run(&mut session, render::print_event).await
    };

    tracing::debug!(
        turns_completed = report.turns_completed,
        aborted = report.is_aborted(),
        "one-shot run finished"
    );

    if json {
        let out = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{out}");
    }

    Ok(if report.is_aborted() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}
