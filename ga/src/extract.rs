//! Response extractor - splits a raw reply into prose and an optional plan
//!
//! The reply is untrusted, semi-structured text. The model is told to end any
//! plan-changing answer with one fenced block tagged `json:roadmap`. That tag
//! is a fixed contract between the directive and this scanner:
//!
//! ````text
//! ...narrative...
//! ```json:roadmap
//! { "root": "...", "steps": [ ... ] }
//! ```
//! ````
//!
//! Only the first tagged block is honored. Ordinary code fences, and any
//! further tagged blocks, pass through untouched.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::roadmap::Roadmap;

/// Fence language tag reserved for the roadmap side channel
pub const ROADMAP_FENCE_TAG: &str = "json:roadmap";

static ROADMAP_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?s)```{}\s*(.*?)\s*```", regex::escape(ROADMAP_FENCE_TAG));
    Regex::new(&pattern).expect("roadmap block pattern is valid")
});

/// What happened to the tagged block, if there was one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStatus {
    /// No tagged block in the reply
    Absent,
    /// Block found and decoded; it was removed from the clean text
    Parsed,
    /// Block found but undecodable; the reply is kept whole
    Malformed { reason: String },
}

/// Result of splitting one reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Text safe to display
    pub clean_text: String,
    /// Plan carried by the reply, only on `BlockStatus::Parsed`
    pub roadmap: Option<Roadmap>,
    pub block: BlockStatus,
}

/// Split a raw model reply
///
/// Never fails. A malformed block degrades to plain narrative: the reply is
/// returned unchanged and no roadmap is produced.
pub fn extract(raw: &str) -> Extraction {
    debug!(raw_len = raw.len(), "extract: called");

    let Some(captures) = ROADMAP_BLOCK.captures(raw) else {
        debug!("extract: no roadmap block");
        return Extraction {
            clean_text: raw.to_string(),
            roadmap: None,
            block: BlockStatus::Absent,
        };
    };

    // Group 0 is the whole fence, group 1 the payload; both always participate
    let (Some(whole), Some(payload)) = (captures.get(0), captures.get(1)) else {
        return Extraction {
            clean_text: raw.to_string(),
            roadmap: None,
            block: BlockStatus::Absent,
        };
    };

    match Roadmap::from_json(payload.as_str()) {
        Ok(roadmap) => {
            debug!(root = %roadmap.root, steps = roadmap.steps.len(), "extract: roadmap block parsed");
            let mut clean_text = String::with_capacity(raw.len() - whole.len());
            clean_text.push_str(&raw[..whole.start()]);
            clean_text.push_str(&raw[whole.end()..]);
            Extraction {
                clean_text: clean_text.trim().to_string(),
                roadmap: Some(roadmap),
                block: BlockStatus::Parsed,
            }
        }
        Err(e) => {
            warn!(error = %e, "extract: roadmap block is malformed, treating reply as narrative");
            Extraction {
                clean_text: raw.to_string(),
                roadmap: None,
                block: BlockStatus::Malformed { reason: e.to_string() },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roadmap::{RoadmapNode, StepStatus};

    #[test]
    fn test_plain_reply_passes_through() {
        let raw = "فقط متن است";
        let extraction = extract(raw);
        assert_eq!(extraction.clean_text, raw);
        assert!(extraction.roadmap.is_none());
        assert_eq!(extraction.block, BlockStatus::Absent);
    }

    #[test]
    fn test_plain_reply_whitespace_is_untouched() {
        let raw = "  padded\n\n";
        assert_eq!(extract(raw).clean_text, raw);
    }

    #[test]
    fn test_roadmap_block_is_split_off() {
        let raw = "پاسخ است\n```json:roadmap\n{\"root\":\"X\",\"steps\":[{\"id\":1,\"title\":\"A\",\"status\":\"done\"}]}\n```";
        let extraction = extract(raw);

        assert_eq!(extraction.clean_text, "پاسخ است");
        assert_eq!(extraction.block, BlockStatus::Parsed);
        assert_eq!(
            extraction.roadmap,
            Some(Roadmap::new("X", vec![RoadmapNode::new(1, "A", StepStatus::Done)]))
        );
    }

    #[test]
    fn test_malformed_block_keeps_reply_whole() {
        let raw = "متن\n```json:roadmap\n{\"root\":\"X\",\"steps\":[],}\n```";
        let extraction = extract(raw);

        assert_eq!(extraction.clean_text, raw);
        assert!(extraction.roadmap.is_none());
        assert!(matches!(extraction.block, BlockStatus::Malformed { .. }));
    }

    #[test]
    fn test_block_only_reply_yields_empty_text() {
        let raw = "```json:roadmap\n{\"root\":\"X\",\"steps\":[]}\n```\n";
        let extraction = extract(raw);
        assert_eq!(extraction.clean_text, "");
        assert_eq!(extraction.roadmap, Some(Roadmap::new("X", vec![])));
    }

    #[test]
    fn test_ordinary_code_fences_are_untouched() {
        let raw = "Intro\n```json\n{\"a\":1}\n```\nMiddle\n```rust\nfn main() {}\n```\n```json:roadmap\n{\"root\":\"R\"}\n```";
        let extraction = extract(raw);

        assert_eq!(
            extraction.clean_text,
            "Intro\n```json\n{\"a\":1}\n```\nMiddle\n```rust\nfn main() {}\n```"
        );
        assert_eq!(extraction.roadmap.map(|r| r.root), Some("R".to_string()));
    }

    #[test]
    fn test_only_first_tagged_block_is_honored() {
        let second = "```json:roadmap\n{\"root\":\"second\"}\n```";
        let raw = format!("a\n```json:roadmap\n{{\"root\":\"first\"}}\n```\nb\n{}", second);
        let extraction = extract(&raw);

        assert_eq!(extraction.roadmap.map(|r| r.root), Some("first".to_string()));
        assert_eq!(extraction.clean_text, format!("a\n\nb\n{}", second));
    }

    #[test]
    fn test_malformed_first_block_does_not_fall_through_to_second() {
        let raw = "```json:roadmap\n{oops\n```\n```json:roadmap\n{\"root\":\"ok\"}\n```";
        let extraction = extract(raw);
        assert!(extraction.roadmap.is_none());
        assert_eq!(extraction.clean_text, raw);
    }

    #[test]
    fn test_text_after_block_is_kept() {
        let raw = "before\n```json:roadmap\n{\"root\":\"R\"}\n```\nafter";
        assert_eq!(extract(raw).clean_text, "before\n\nafter");
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let raw = "x ```json:roadmap [] ```";
        let extraction = extract(raw);
        assert!(matches!(extraction.block, BlockStatus::Malformed { .. }));
        assert_eq!(extraction.clean_text, raw);
    }

    #[test]
    fn test_block_pattern_follows_fence_tag() {
        assert!(ROADMAP_BLOCK.as_str().contains(&regex::escape(ROADMAP_FENCE_TAG)));
        let raw = format!("x\n```{}\n{{\"root\":\"R\"}}\n```", ROADMAP_FENCE_TAG);
        assert_eq!(extract(&raw).block, BlockStatus::Parsed);
    }

    #[test]
    fn test_unterminated_block_is_absent() {
        let raw = "x\n```json:roadmap\n{\"root\":\"R\"}";
        let extraction = extract(raw);
        assert_eq!(extraction.block, BlockStatus::Absent);
        assert_eq!(extraction.clean_text, raw);
    }
}
