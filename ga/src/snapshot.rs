//! Session snapshots - persisting conversation and roadmap together
//!
//! A snapshot is one JSON document:
//!
//! ```text
//! {
//!   "conversation": [ { "role": "user", "content": "..." }, ... ],
//!   "roadmap": { "root": "...", "steps": [ ... ] } | null
//! }
//! ```
//!
//! Loading tolerates missing fields and a bad roadmap, but not a document
//! that is not JSON at all: that is reported as corrupt so the caller can
//! keep its current state and warn the user.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::conversation::{Conversation, Turn};
use crate::roadmap::{MAX_DEPTH, Roadmap};

/// Keys written by the earlier browser client, accepted on load
const LEGACY_CONVERSATION_KEY: &str = "chatHistory";
const LEGACY_ROADMAP_KEY: &str = "roadmapData";

/// Errors from encoding, decoding or storing snapshots
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to access snapshot {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Roadmap nests {depth} levels deep, at most {limit} can be saved")]
    TooDeep { depth: usize, limit: usize },
}

impl SnapshotError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, SnapshotError::Corrupt(_))
    }
}

/// Decoded snapshot contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub conversation: Conversation,
    pub roadmap: Option<Roadmap>,
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    conversation: &'a Conversation,
    roadmap: Option<&'a Roadmap>,
}

/// Encode conversation and roadmap as one pretty-printed JSON document
///
/// A roadmap deeper than [`MAX_DEPTH`] is refused, since it could not be
/// loaded back.
pub fn serialize(conversation: &Conversation, roadmap: Option<&Roadmap>) -> Result<Vec<u8>, SnapshotError> {
    debug!(turns = conversation.len(), has_roadmap = roadmap.is_some(), "serialize: called");
    if let Some(depth) = roadmap.map(Roadmap::depth).filter(|d| *d > MAX_DEPTH) {
        return Err(SnapshotError::TooDeep {
            depth,
            limit: MAX_DEPTH,
        });
    }
    let document = SnapshotDocument { conversation, roadmap };
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Decode a snapshot document
///
/// Missing or null `conversation` gives an empty conversation. Missing,
/// null or malformed `roadmap` gives no roadmap. Anything that is not a JSON
/// object, or a `conversation` that is not a list of turns, is corrupt.
pub fn deserialize(bytes: &[u8]) -> Result<Snapshot, SnapshotError> {
    debug!(len = bytes.len(), "deserialize: called");
    let document: Value = serde_json::from_slice(bytes).map_err(|e| SnapshotError::Corrupt(e.to_string()))?;

    let Value::Object(mut fields) = document else {
        debug!("deserialize: document is not an object");
        return Err(SnapshotError::Corrupt("snapshot must be a JSON object".to_string()));
    };

    let conversation = match take_field(&mut fields, "conversation", LEGACY_CONVERSATION_KEY) {
        None => {
            debug!("deserialize: no conversation field");
            Conversation::new()
        }
        Some(value) => {
            let turns: Vec<Turn> =
                serde_json::from_value(value).map_err(|e| SnapshotError::Corrupt(format!("conversation: {}", e)))?;
            Conversation::from(turns)
        }
    };

    let roadmap = match take_field(&mut fields, "roadmap", LEGACY_ROADMAP_KEY) {
        None => None,
        Some(value) => match Roadmap::from_value(value) {
            Ok(roadmap) => Some(roadmap),
            Err(e) => {
                warn!(error = %e, "deserialize: malformed roadmap field, loading without roadmap");
                None
            }
        },
    };

    Ok(Snapshot { conversation, roadmap })
}

/// Remove a field by its current or legacy key, treating null as absent
fn take_field(fields: &mut serde_json::Map<String, Value>, key: &str, legacy_key: &str) -> Option<Value> {
    let value = fields.remove(key).or_else(|| fields.remove(legacy_key))?;
    if value.is_null() { None } else { Some(value) }
}

/// Write a snapshot file, replacing any previous one in a single rename
pub fn save_to_path(path: &Path, conversation: &Conversation, roadmap: Option<&Roadmap>) -> Result<(), SnapshotError> {
    debug!(path = %path.display(), "save_to_path: called");
    let bytes = serialize(conversation, roadmap)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SnapshotError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes).map_err(|source| SnapshotError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), turns = conversation.len(), "Snapshot saved");
    Ok(())
}

/// Read and decode a snapshot file
pub fn load_from_path(path: &Path) -> Result<Snapshot, SnapshotError> {
    debug!(path = %path.display(), "load_from_path: called");
    let bytes = fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = deserialize(&bytes)?;
    info!(path = %path.display(), turns = snapshot.conversation.len(), "Snapshot loaded");
    Ok(snapshot)
}
