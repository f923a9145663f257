//! Gemini Architect - conversational project planning
//!
//! CLI entry point for the interactive session and snapshot inspection.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use architect::cli::{Cli, Command};
use architect::config::{APP_DIR, Config};
use architect::llm::create_client;
use architect::repl::render::{print_roadmap, print_transcript};
use architect::repl::{ConsoleObserver, run_interactive};
use architect::session::{ArchitectSession, transcript_from};
use architect::snapshot;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("ga.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Gemini Architect loaded config: model={}", config.llm.model);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Chat { load, task }) => {
            debug!(?load, ?task, "main: matched Chat command");
            run_interactive(&config, load, task).await
        }
        Some(Command::Ask { message, load, save }) => {
            debug!(?load, ?save, "main: matched Ask command");
            cmd_ask(&config, &message, load.as_deref(), save.as_deref()).await
        }
        Some(Command::Roadmap { snapshot }) => {
            debug!(snapshot = %snapshot.display(), "main: matched Roadmap command");
            cmd_roadmap(&snapshot)
        }
        Some(Command::History { snapshot }) => {
            debug!(snapshot = %snapshot.display(), "main: matched History command");
            cmd_history(&snapshot)
        }
        None => {
            debug!("main: no command specified, starting chat");
            run_interactive(&config, None, None).await
        }
    }
}

/// Run a single turn without the REPL
async fn cmd_ask(config: &Config, message: &str, load: Option<&Path>, save: Option<&Path>) -> Result<()> {
    debug!(message_len = message.len(), "cmd_ask: called");
    config.validate()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let mut observer = ConsoleObserver::default();
    let mut session = ArchitectSession::new(llm);

    if let Some(path) = load {
        session
            .load(path, &mut observer)
            .context(format!("Failed to load session from {}", path.display()))?;
    }

    let outcome = session.submit_turn(message, &mut observer).await?;
    if outcome.is_failure() {
        // The observer has already printed the error
        debug!("cmd_ask: turn failed, exiting with status 1");
        std::process::exit(1);
    }

    if let Some(path) = save {
        session
            .save(path)
            .context(format!("Failed to save session to {}", path.display()))?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

/// Print the roadmap stored in a snapshot file
fn cmd_roadmap(path: &Path) -> Result<()> {
    debug!(path = %path.display(), "cmd_roadmap: called");
    let snapshot = snapshot::load_from_path(path).context("Failed to read snapshot")?;
    print_roadmap(snapshot.roadmap.as_ref());
    Ok(())
}

/// Print the conversation stored in a snapshot file
fn cmd_history(path: &Path) -> Result<()> {
    debug!(path = %path.display(), "cmd_history: called");
    let snapshot = snapshot::load_from_path(path).context("Failed to read snapshot")?;
    print_transcript(&transcript_from(&snapshot.conversation), false);
    Ok(())
}
