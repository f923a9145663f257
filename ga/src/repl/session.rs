//! REPL session management

use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use super::render::{error_line, print_roadmap, print_transcript};
use crate::config::{GithubConfig, SessionConfig};
use crate::conversation::Speaker;
use crate::github::{RepoStatus, verify_project};
use crate::roadmap::Roadmap;
use crate::session::{ArchitectSession, SessionError, SessionObserver, TurnOutcome};

/// Confirmation asked before /clear ("are you sure you want to clear the whole chat?")
const CLEAR_CONFIRMATION: &str = "آیا مطمئن هستید که می‌خواهید تمام چت را پاک کنید؟";

/// Prints session events to the terminal
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    /// Echo user turns; off in the REPL where readline already shows them
    pub echo_user: bool,
}

impl SessionObserver for ConsoleObserver {
    fn on_clean_text_ready(&mut self, text: &str, role: Speaker) {
        match role {
            Speaker::User => {
                if self.echo_user {
                    println!("{} {}", ">".bright_green(), text);
                }
            }
            Speaker::Model => {
                println!();
                println!("{}", text);
                println!();
            }
        }
    }

    fn on_roadmap_replaced(&mut self, roadmap: Option<&Roadmap>) {
        print_roadmap(roadmap);
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("{}", error_line(message).red());
    }
}

/// Interactive REPL session
pub struct ReplSession {
    session: ArchitectSession,
    observer: ConsoleObserver,
    settings: SessionConfig,
    github: GithubConfig,
}

impl ReplSession {
    pub fn new(session: ArchitectSession, settings: SessionConfig, github: GithubConfig) -> Self {
        Self {
            session,
            observer: ConsoleObserver::default(),
            settings,
            github,
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_task: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(task) = initial_task {
            println!("{} {}", ">".bright_green(), task);
            self.process_user_input(&task).await;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input, &mut rl) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_user_input(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Gemini Architect".bright_cyan().bold());
        println!("{}", RepoStatus::from_config(&self.github).describe().dimmed());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        if self.session.roadmap().is_some() || !self.session.conversation().is_empty() {
            println!(
                "{}",
                format!("Restored {} turns", self.session.conversation().len()).dimmed()
            );
            print_roadmap(self.session.roadmap());
        }
        println!();
    }

    fn handle_slash_command(&mut self, input: &str, rl: &mut DefaultEditor) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        let arg = parts.get(1).map(PathBuf::from);
        debug!(%cmd, ?arg, "handle_slash_command: called");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/clear" | "/c" => {
                if confirm(rl, CLEAR_CONFIRMATION) {
                    self.session.reset(&mut self.observer);
                    println!("{}", "Conversation cleared.".dimmed());
                } else {
                    println!("{}", "Kept the conversation.".dimmed());
                }
                SlashResult::Continue
            }
            "/save" | "/s" => {
                let path = arg.unwrap_or_else(|| self.settings.snapshot_path.clone());
                match self.session.save(&path) {
                    Ok(()) => println!("{} {}", "Saved to".dimmed(), path.display()),
                    Err(e) => eprintln!("{}", error_line(&e.to_string()).red()),
                }
                SlashResult::Continue
            }
            "/load" | "/l" => {
                let path = arg.unwrap_or_else(|| self.settings.snapshot_path.clone());
                match self.session.load(&path, &mut self.observer) {
                    Ok(()) => println!(
                        "{} {} ({} turns)",
                        "Loaded".dimmed(),
                        path.display(),
                        self.session.conversation().len()
                    ),
                    Err(SessionError::Snapshot(e)) if e.is_corrupt() => {
                        eprintln!("{}", error_line("Invalid session file.").red());
                        warn!(error = %e, "handle_slash_command: corrupt snapshot, state kept");
                    }
                    Err(e) => eprintln!("{}", error_line(&e.to_string()).red()),
                }
                SlashResult::Continue
            }
            "/roadmap" | "/r" => {
                print_roadmap(self.session.roadmap());
                SlashResult::Continue
            }
            "/history" => {
                println!();
                print_transcript(self.session.transcript(), true);
                println!();
                SlashResult::Continue
            }
            "/verify" => {
                let report = verify_project(&self.github);
                println!("{}", report.status.describe().dimmed());
                println!("{}", report.message.yellow());
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:16} Show this help", "/help".yellow());
        println!("  {:16} Exit the REPL", "/quit".yellow());
        println!("  {:16} Clear conversation and roadmap", "/clear".yellow());
        println!("  {:16} Save the session snapshot", "/save [path]".yellow());
        println!("  {:16} Load a session snapshot", "/load [path]".yellow());
        println!("  {:16} Show the roadmap", "/roadmap".yellow());
        println!("  {:16} Show conversation history", "/history".yellow());
        println!("  {:16} Verify the project on GitHub", "/verify".yellow());
        println!();
        println!(
            "Default snapshot: {}",
            self.settings.snapshot_path.display().to_string().dimmed()
        );
        println!();
    }

    /// Send one turn and autosave on success
    async fn process_user_input(&mut self, input: &str) {
        print!("{}", "thinking...".dimmed());
        let _ = io::stdout().flush();

        let result = self.session.submit_turn(input, &mut self.observer).await;
        print!("\r{}\r", " ".repeat(12));
        let _ = io::stdout().flush();

        match result {
            Ok(TurnOutcome::Replied { .. }) => {
                if self.settings.autosave {
                    self.autosave();
                }
            }
            Ok(TurnOutcome::Failed { .. }) => {}
            Err(e) => {
                debug!(error = %e, "process_user_input: turn rejected");
            }
        }
    }

    fn autosave(&self) {
        debug!(path = %self.settings.snapshot_path.display(), "autosave: called");
        if let Err(e) = self.session.save(&self.settings.snapshot_path) {
            warn!(error = %e, "autosave: failed");
            eprintln!("{}", error_line(&e.to_string()).red());
        }
    }
}

/// Ask a yes/no question; anything but y/yes declines
fn confirm(rl: &mut DefaultEditor, question: &str) -> bool {
    match rl.readline(&format!("{} [y/N] ", question)) {
        Ok(answer) => is_yes(&answer),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "بله")
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(is_yes("بله"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
