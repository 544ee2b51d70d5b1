//! Interactive line-oriented shell.
//!
//! Protocol:
//! - Lines starting with `#` are commands (thought, start, kind, memory, ...)
//! - Any other line is added to shared memory as a thought
//! - Conversation output is printed as it arrives

use crate::render::{format_memory, format_weights, print_event};
use crate::resolve_model;
use duet_core::session::{MAX_TURNS, MIN_TURNS};
use duet_core::{
    ChatBackend, ConversationEvent, ConversationReport, ConversationType, Driver, Session,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_WEIGHTS_SHOWN: usize = 10;

/// A parsed shell line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Thought(String),
    Start(Option<usize>),
    Kind(String),
    Model(String),
    Turns(String),
    Memory,
    Weights(usize),
    Status,
    Reset,
    Help,
    Quit,
    Unknown(String),
    Usage(&'static str),
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(rest) = line.strip_prefix('#') else {
        return Some(Command::Thought(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "thought" | "add" if arg.is_empty() => Command::Usage("#thought <text>"),
        "thought" | "add" => Command::Thought(arg.to_string()),
        "start" | "go" if arg.is_empty() => Command::Start(None),
        "start" | "go" => match arg.parse::<usize>() {
            Ok(n) => Command::Start(Some(n)),
            Err(_) => Command::Usage("#start [turns]"),
        },
        "kind" | "type" if arg.is_empty() => Command::Usage("#kind <type>"),
        "kind" | "type" => Command::Kind(arg.to_string()),
        "model" if arg.is_empty() => Command::Usage("#model <fast|smart|id>"),
        "model" => Command::Model(arg.to_string()),
        "turns" if arg.is_empty() => Command::Usage("#turns <n>"),
        "turns" => Command::Turns(arg.to_string()),
        "memory" | "mem" => Command::Memory,
        "weights" => match arg {
            "" => Command::Weights(DEFAULT_WEIGHTS_SHOWN),
            n => n
                .parse()
                .map(Command::Weights)
                .unwrap_or(Command::Usage("#weights [n]")),
        },
        "status" => Command::Status,
        "reset" | "clear" => Command::Reset,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

/// Run the shell until `#quit` or end of input.
pub async fn run_shell<B: ChatBackend>(
    mut driver: Driver<B>,
    mut session: Session,
) -> std::io::Result<()> {
    println!("=== Duet ===");
    print_status(&driver, &session);
    println!();
    print_help();
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Quit => {
                println!("Goodbye!");
                break;
            }
            Command::Thought(text) => {
                if session.add_thought(&text) {
                    println!("[MEMORY] Thought added to shared memory.");
                } else {
                    println!("[ERROR] Please enter a thought.");
                }
            }
            Command::Start(turns) => {
                if session.memory().is_empty() {
                    println!("[WARN] Shared memory is empty; the personas start from nothing.");
                }
                let planned = turns.unwrap_or(driver.config().turns());
                let report = start(&mut driver, &mut session, turns, print_event).await;
                println!(
                    "[DONE] {} of {} turns completed{}",
                    report.turns_completed,
                    planned.clamp(MIN_TURNS, MAX_TURNS),
                    if report.is_aborted() { " (aborted)" } else { "" }
                );
            }
            Command::Kind(name) => match name.parse::<ConversationType>() {
                Ok(kind) => {
                    driver.config_mut().conversation_type = kind;
                    println!("[SET] Conversation type: {kind}");
                }
                Err(e) => println!("[ERROR] {e}. Try one of: {}", kind_slugs()),
            },
            Command::Model(name) => {
                let model = resolve_model(&name);
                println!("[SET] Model: {model}");
                driver.config_mut().model = model;
            }
            Command::Turns(arg) => match arg.parse::<usize>() {
                Ok(n) if (MIN_TURNS..=MAX_TURNS).contains(&n) => {
                    driver.config_mut().set_turns(n);
                    println!("[SET] Turns: {n}");
                }
                _ => println!("[ERROR] Turns must be between {MIN_TURNS} and {MAX_TURNS}"),
            },
            Command::Memory => println!("{}", format_memory(session.memory())),
            Command::Weights(n) => println!("{}", format_weights(session.memory(), n)),
            Command::Status => print_status(&driver, &session),
            Command::Reset => {
                session.reset();
                println!("[RESET] Shared memory and weights cleared.");
            }
            Command::Help => print_help(),
            Command::Usage(usage) => println!("[ERROR] Usage: {usage}"),
            Command::Unknown(name) => {
                println!("[ERROR] Unknown command '#{name}'. Type #help for help.")
            }
        }
        stdout.flush().ok();
    }

    Ok(())
}

/// Run one conversation. A turn count given here applies to this run only.
async fn start<B, F>(
    driver: &mut Driver<B>,
    session: &mut Session,
    turns: Option<usize>,
    on_event: F,
) -> ConversationReport
where
    B: ChatBackend,
    F: FnMut(&ConversationEvent),
{
    let saved = driver.config().turns();
    if let Some(n) = turns {
        driver.config_mut().set_turns(n);
    }
    let report = driver.run(session, on_event).await;
    driver.config_mut().set_turns(saved);
    report
}

fn print_status<B: ChatBackend>(driver: &Driver<B>, session: &Session) {
    let config = driver.config();
    println!("[STATUS]");
    println!("  Model: {}", config.model);
    println!("  Conversation type: {}", config.conversation_type);
    println!("  Turns: {}", config.turns());
    println!(
        "  Memory: {}/{} entries, {} weighted words",
        session.memory().len(),
        session.memory().capacity(),
        session.memory().weights().len()
    );
}

fn print_help() {
    println!("Commands:");
    println!("  #thought <text>  - Add a thought to shared memory (plain lines do too)");
    println!("  #start [turns]   - Start the conversation");
    println!("  #kind <type>     - Set the conversation type ({})", kind_slugs());
    println!("  #model <model>   - Set the model (fast, smart, or an id)");
    println!("  #turns <n>       - Set the number of turns ({MIN_TURNS}-{MAX_TURNS})");
    println!("  #memory          - Show shared memory with scores");
    println!("  #weights [n]     - Show the heaviest words");
    println!("  #status          - Show current settings");
    println!("  #reset           - Clear memory and weights");
    println!("  #quit            - Exit");
}

fn kind_slugs() -> String {
    ConversationType::ALL
        .iter()
        .map(|k| k.slug())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_core::{ScriptedBackend, SessionConfig};

    #[test]
    fn test_plain_line_is_thought() {
        assert_eq!(
            parse_command("  what is love?  "),
            Some(Command::Thought("what is love?".to_string()))
        );
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_command("#start"), Some(Command::Start(None)));
        assert_eq!(parse_command("#start 12"), Some(Command::Start(Some(12))));
        assert_eq!(
            parse_command("#thought the sea"),
            Some(Command::Thought("the sea".to_string()))
        );
        assert_eq!(
            parse_command("#kind Panel Discussion"),
            Some(Command::Kind("Panel Discussion".to_string()))
        );
        assert_eq!(parse_command("#weights"), Some(Command::Weights(10)));
        assert_eq!(parse_command("#weights 3"), Some(Command::Weights(3)));
        assert_eq!(parse_command("#QUIT"), Some(Command::Quit));
        assert_eq!(parse_command("#mem"), Some(Command::Memory));
    }

    #[tokio::test]
    async fn test_start_turns_apply_to_one_run() {
        let backend = ScriptedBackend::texts(["a", "b", "c", "d", "sum", "e", "f", "sum"]);
        let mut driver = Driver::new(backend, SessionConfig::new().with_turns(1));
        let mut session = Session::new();

        let report = start(&mut driver, &mut session, Some(2), |_| {}).await;
        assert_eq!(report.turns_completed, 2);
        assert_eq!(driver.config().turns(), 1);

        let report = start(&mut driver, &mut session, None, |_| {}).await;
        assert_eq!(report.turns_completed, 1);
        assert_eq!(driver.backend().request_count(), 8);
    }

    #[test]
    fn test_bad_arguments() {
        assert_eq!(parse_command("#thought"), Some(Command::Usage("#thought <text>")));
        assert_eq!(parse_command("#start lots"), Some(Command::Usage("#start [turns]")));
        assert_eq!(parse_command("#weights x"), Some(Command::Usage("#weights [n]")));
        assert_eq!(
            parse_command("#dance"),
            Some(Command::Unknown("dance".to_string()))
        );
    }
}
