//! Interactive REPL for the architect
//!
//! Line editing, slash commands and terminal rendering of the transcript and
//! roadmap. The REPL is only a rendering collaborator: all state lives in
//! [`ArchitectSession`].

pub mod render;
mod session;

pub use session::{ConsoleObserver, ReplSession};

use std::path::PathBuf;

use eyre::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::github::RepoStatus;
use crate::llm::create_client;
use crate::session::{ArchitectSession, NullObserver};

/// Run the interactive REPL
///
/// This is the main entry point for `ga chat`.
pub async fn run_interactive(config: &Config, load: Option<PathBuf>, initial_task: Option<String>) -> Result<()> {
    config.validate()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    info!(model = %config.llm.model, "Connected to Gemini");
    info!("{}", RepoStatus::from_config(&config.github).describe());

    let mut session = ArchitectSession::new(llm);
    if let Some(path) = load {
        session
            .load(&path, &mut NullObserver)
            .context(format!("Failed to load session from {}", path.display()))?;
    }

    let mut repl = ReplSession::new(session, config.session.clone(), config.github.clone());
    repl.run(initial_task).await
}
