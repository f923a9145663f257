//! Gemini Architect - conversational project planning with a live roadmap
//!
//! A user describes a software project in Persian; a Gemini model answers and,
//! whenever the plan changes, appends a machine-readable roadmap block to its
//! reply. The session splits each reply into display text and a roadmap tree,
//! keeps the full conversation for replay, and can save and restore both.
//!
//! # Modules
//!
//! - [`session`] - the turn pipeline and session state
//! - [`conversation`] - replayable turn history
//! - [`request`] - behavior directive and request assembly
//! - [`llm`] - transport trait and Gemini client
//! - [`extract`] - roadmap block extraction from replies
//! - [`roadmap`] - the plan tree and its render order
//! - [`snapshot`] - session persistence
//! - [`repl`] - interactive terminal front end
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod conversation;
pub mod extract;
pub mod github;
pub mod llm;
pub mod repl;
pub mod request;
pub mod roadmap;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use config::{Config, GithubConfig, LlmConfig, SessionConfig};
pub use conversation::{Conversation, Speaker, Turn};
pub use extract::{BlockStatus, Extraction, extract};
pub use llm::{CompletionRequest, GeminiClient, LlmClient, LlmError, Message, Role, create_client};
pub use request::{BEHAVIOR_DIRECTIVE, build_request};
pub use roadmap::{Roadmap, RoadmapModel, RoadmapNode, StepStatus, render_plan};
pub use session::{
    ArchitectSession, EntryKind, NullObserver, SessionError, SessionObserver, TranscriptEntry, TurnOutcome,
};
pub use snapshot::{Snapshot, SnapshotError};
