//! ArchitectSession - one conversation with the model and its live roadmap
//!
//! The session owns the transport client, the replayable conversation, the
//! current roadmap and the visible transcript. It drives exactly one turn at
//! a time; `submit_turn` takes `&mut self`, so a second submission, a load or
//! a reset cannot overlap a request that is still outstanding.
//!
//! # Turn pipeline
//!
//! ```text
//! text → Conversation.append(user) → build_request → LlmClient.send
//!      → extract → [RoadmapModel.replace] + Conversation.append(model)
//!      → observer callbacks
//! ```
//!
//! A transport failure rolls the conversation back to where it was before
//! the submission and shows an error entry instead. Failures never reach the
//! replayed history.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::conversation::{Conversation, Speaker, Turn};
use crate::extract::{BlockStatus, extract};
use crate::llm::LlmClient;
use crate::request::build_request;
use crate::roadmap::{Roadmap, RoadmapModel};
use crate::snapshot::{self, Snapshot, SnapshotError};

/// Rendering collaborator notified as the session changes
pub trait SessionObserver {
    /// Display-ready text for a turn
    fn on_clean_text_ready(&mut self, text: &str, role: Speaker);

    /// The roadmap was replaced, cleared (`None`) or restored
    fn on_roadmap_replaced(&mut self, roadmap: Option<&Roadmap>);

    /// A plain, user-facing failure message
    fn on_error(&mut self, message: &str);
}

/// Observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SessionObserver for NullObserver {
    fn on_clean_text_ready(&mut self, _text: &str, _role: Speaker) {}
    fn on_roadmap_replaced(&mut self, _roadmap: Option<&Roadmap>) {}
    fn on_error(&mut self, _message: &str) {}
}

/// Kind of a visible transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Model,
    Error,
}

/// Something the user has been shown; never replayed to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
}

/// Errors a caller must handle
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Message is empty")]
    EmptyTurn,

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// How a submitted turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered; `block` tells what happened to the roadmap block
    Replied { block: BlockStatus },
    /// The transport failed; the message was shown as an error entry
    Failed { message: String },
}

impl TurnOutcome {
    /// The turn failed; the message has already reached the observer
    pub fn is_failure(&self) -> bool {
        matches!(self, TurnOutcome::Failed { .. })
    }
}

/// Conversation state plus the client that advances it
pub struct ArchitectSession {
    llm: Arc<dyn LlmClient>,
    conversation: Conversation,
    roadmap: RoadmapModel,
    transcript: Vec<TranscriptEntry>,
}

impl ArchitectSession {
    /// Start an empty session
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        info!("Starting architect session");
        Self {
            llm,
            conversation: Conversation::new(),
            roadmap: RoadmapModel::new(),
            transcript: Vec::new(),
        }
    }

    /// Start a session from a decoded snapshot
    pub fn from_snapshot(llm: Arc<dyn LlmClient>, snapshot: Snapshot) -> Self {
        let mut session = Self::new(llm);
        session.apply_snapshot(snapshot);
        session
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn roadmap(&self) -> Option<&Roadmap> {
        self.roadmap.current()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Run one user turn through the pipeline
    ///
    /// Empty input is rejected before anything is stored. A transport error
    /// is not an `Err`: it is shown through the observer and reported as
    /// `TurnOutcome::Failed`.
    pub async fn submit_turn(
        &mut self,
        text: &str,
        observer: &mut dyn SessionObserver,
    ) -> Result<TurnOutcome, SessionError> {
        let text = text.trim();
        debug!(text_len = text.len(), "submit_turn: called");
        if text.is_empty() {
            debug!("submit_turn: empty input rejected");
            return Err(SessionError::EmptyTurn);
        }

        self.show(EntryKind::User, text);
        observer.on_clean_text_ready(text, Speaker::User);

        let mark = self.conversation.len();
        self.conversation.append(Turn::user(text));
        let request = build_request(&self.conversation);

        match self.llm.send(request).await {
            Ok(raw) => {
                let extraction = extract(&raw);
                if let Some(roadmap) = extraction.roadmap {
                    info!(root = %roadmap.root, steps = roadmap.step_count(), "Roadmap replaced");
                    self.roadmap.replace(roadmap);
                    observer.on_roadmap_replaced(self.roadmap.current());
                }

                // The raw reply is replayed so the model keeps seeing its own plan
                self.conversation.append(Turn::model(raw));
                self.show(EntryKind::Model, &extraction.clean_text);
                observer.on_clean_text_ready(&extraction.clean_text, Speaker::Model);

                debug!(block = ?extraction.block, "submit_turn: reply handled");
                Ok(TurnOutcome::Replied {
                    block: extraction.block,
                })
            }
            Err(e) => {
                warn!(
                    error = %e,
                    status = ?e.status(),
                    endpoint = e.is_endpoint_error(),
                    "submit_turn: transport failed, rolling back turn"
                );
                self.conversation.truncate(mark);
                let message = e.to_string();
                self.show(EntryKind::Error, &message);
                observer.on_error(&message);
                Ok(TurnOutcome::Failed { message })
            }
        }
    }

    /// Forget the conversation, the roadmap and the transcript
    pub fn reset(&mut self, observer: &mut dyn SessionObserver) {
        info!(
            turns = self.conversation.len(),
            had_roadmap = !self.roadmap.is_empty(),
            "Resetting session"
        );
        self.conversation.reset();
        self.roadmap.clear();
        self.transcript.clear();
        observer.on_roadmap_replaced(None);
    }

    /// Encode the current state as snapshot bytes
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, SessionError> {
        Ok(snapshot::serialize(&self.conversation, self.roadmap.current())?)
    }

    /// Save the current state to a snapshot file
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        debug!(path = %path.display(), "save: called");
        snapshot::save_to_path(path, &self.conversation, self.roadmap.current())?;
        Ok(())
    }

    /// Replace state from snapshot bytes, all or nothing
    ///
    /// On any error the current conversation and roadmap are left as they were.
    pub fn load_bytes(&mut self, bytes: &[u8], observer: &mut dyn SessionObserver) -> Result<(), SessionError> {
        debug!(len = bytes.len(), "load_bytes: called");
        let snapshot = snapshot::deserialize(bytes)?;
        self.apply_snapshot(snapshot);
        observer.on_roadmap_replaced(self.roadmap.current());
        Ok(())
    }

    /// Replace state from a snapshot file, all or nothing
    pub fn load(&mut self, path: &Path, observer: &mut dyn SessionObserver) -> Result<(), SessionError> {
        debug!(path = %path.display(), "load: called");
        let snapshot = snapshot::load_from_path(path)?;
        self.apply_snapshot(snapshot);
        observer.on_roadmap_replaced(self.roadmap.current());
        Ok(())
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        info!(
            turns = snapshot.conversation.len(),
            has_roadmap = snapshot.roadmap.is_some(),
            "Restoring session from snapshot"
        );
        self.transcript = transcript_from(&snapshot.conversation);
        self.conversation.replace(snapshot.conversation.into_turns());
        self.roadmap.restore(snapshot.roadmap);
    }

    fn show(&mut self, kind: EntryKind, text: &str) {
        self.transcript.push(TranscriptEntry {
            kind,
            text: text.to_string(),
        });
    }
}

/// Rebuild what the user would have seen for a restored conversation
pub fn transcript_from(conversation: &Conversation) -> Vec<TranscriptEntry> {
    conversation
        .iter()
        .map(|turn| match turn.role {
            Speaker::User => TranscriptEntry {
                kind: EntryKind::User,
                text: turn.content.clone(),
            },
            Speaker::Model => TranscriptEntry {
                kind: EntryKind::Model,
                text: extract(&turn.content).clean_text,
            },
        })
        .collect()
}
