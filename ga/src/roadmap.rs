//! Roadmap model - the hierarchical project plan
//!
//! A roadmap is only ever replaced as a whole. There is no merge: each
//! successfully extracted plan supersedes the previous one entirely, so the
//! model never has to reconcile partial updates against an older tree.
//!
//! Decoding is structural and lenient. Unknown fields are ignored, missing
//! fields take defaults, and an unrecognized `status` reads as pending.
//!
//! Nesting is capped at [`MAX_DEPTH`] levels of steps. A plan at the cap,
//! wrapped in a snapshot document, still fits serde_json's nesting limit of
//! 128, so every plan accepted from a reply can be saved and loaded back.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Deepest step nesting accepted; top-level steps are depth 1
///
/// Each level costs two JSON nesting levels (node object and `substeps`
/// array), plus two for the roadmap object and its `steps` array and one for
/// the snapshot document.
pub const MAX_DEPTH: usize = 60;

/// Project name used when the plan does not carry one
pub const DEFAULT_ROOT: &str = "پروژه";

/// Progress of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Done,
    Active,
    #[default]
    Pending,
}

impl StepStatus {
    /// Parse a status label, case-insensitively; anything unknown is pending
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "done" => StepStatus::Done,
            "active" => StepStatus::Active,
            "pending" => StepStatus::Pending,
            other => {
                debug!(status = %other, "StepStatus::from_label: unrecognized, defaulting to Pending");
                StepStatus::Pending
            }
        }
    }
}

impl<'de> Deserialize<'de> for StepStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(label)) => StepStatus::from_label(&label),
            _ => StepStatus::Pending,
        })
    }
}

/// One step of the plan, possibly with nested substeps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapNode {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,

    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,

    #[serde(default)]
    pub status: StepStatus,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub substeps: Vec<RoadmapNode>,
}

impl RoadmapNode {
    pub fn new(id: i64, title: impl Into<String>, status: StepStatus) -> Self {
        Self {
            id,
            title: title.into(),
            status,
            substeps: Vec::new(),
        }
    }

    pub fn with_substeps(mut self, substeps: Vec<RoadmapNode>) -> Self {
        self.substeps = substeps;
        self
    }
}

/// The whole plan: a project name and its ordered top-level steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roadmap {
    #[serde(default = "default_root", deserialize_with = "lenient_root")]
    pub root: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub steps: Vec<RoadmapNode>,
}

impl Roadmap {
    pub fn new(root: impl Into<String>, steps: Vec<RoadmapNode>) -> Self {
        Self {
            root: root.into(),
            steps,
        }
    }

    /// Structurally decode a roadmap from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Decode from an already-parsed JSON value
    ///
    /// Only a JSON object is a roadmap; serde would otherwise accept an
    /// array as a positional struct. Plans nested deeper than [`MAX_DEPTH`]
    /// are rejected.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Err(serde::de::Error::custom("roadmap must be a JSON object"));
        }
        let roadmap: Self = serde_json::from_value(value)?;
        let depth = roadmap.depth();
        if depth > MAX_DEPTH {
            debug!(depth, "Roadmap::from_value: too deep");
            return Err(serde::de::Error::custom(format!(
                "roadmap nests {} levels deep, at most {} allowed",
                depth, MAX_DEPTH
            )));
        }
        Ok(roadmap)
    }

    /// Levels of steps; 0 without steps, 1 for top-level steps only
    pub fn depth(&self) -> usize {
        render_plan(self).iter().map(|e| e.depth + 1).max().unwrap_or(0)
    }

    /// Number of steps at every depth
    pub fn step_count(&self) -> usize {
        render_plan(self).len()
    }

    /// Status tally over every step
    pub fn progress(&self) -> Progress {
        let mut progress = Progress::default();
        for entry in render_plan(self) {
            progress.total += 1;
            match entry.node.status {
                StepStatus::Done => progress.done += 1,
                StepStatus::Active => progress.active += 1,
                StepStatus::Pending => {}
            }
        }
        progress
    }
}

/// Status counts over a roadmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub active: usize,
    pub total: usize,
}

/// Holder for the current roadmap, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoadmapModel {
    current: Option<Roadmap>,
}

impl RoadmapModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale replacement with a freshly extracted plan
    pub fn replace(&mut self, roadmap: Roadmap) {
        debug!(root = %roadmap.root, steps = roadmap.steps.len(), "RoadmapModel::replace: called");
        self.current = Some(roadmap);
    }

    pub fn clear(&mut self) {
        debug!("RoadmapModel::clear: called");
        self.current = None;
    }

    /// Restore from a snapshot, which may have no plan
    pub fn restore(&mut self, roadmap: Option<Roadmap>) {
        debug!(present = roadmap.is_some(), "RoadmapModel::restore: called");
        self.current = roadmap;
    }

    pub fn current(&self) -> Option<&Roadmap> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

/// One line of the render plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderEntry<'a> {
    /// 0 for top-level steps
    pub depth: usize,
    pub node: &'a RoadmapNode,
}

/// Flatten the tree depth-first, pre-order, children in source order
///
/// Every node is emitted, with or without substeps. Order is never sorted.
pub fn render_plan(roadmap: &Roadmap) -> Vec<RenderEntry<'_>> {
    debug!(steps = roadmap.steps.len(), "render_plan: called");
    let mut entries = Vec::new();
    push_subtree(&roadmap.steps, 0, &mut entries);
    entries
}

fn push_subtree<'a>(nodes: &'a [RoadmapNode], depth: usize, entries: &mut Vec<RenderEntry<'a>>) {
    for node in nodes {
        entries.push(RenderEntry { depth, node });
        push_subtree(&node.substeps, depth + 1, entries);
    }
}

fn default_root() -> String {
    DEFAULT_ROOT.to_string()
}

fn lenient_root<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(default_root()),
        Some(Value::String(root)) => Ok(root),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(scalar.to_string()),
        Some(other) => {
            debug!(root = %other, "lenient_root: non-scalar root, using default");
            Ok(default_root())
        }
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let id = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    Ok(id)
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<RoadmapNode>, D::Error> {
    Ok(Option::<Vec<RoadmapNode>>::deserialize(deserializer)?.unwrap_or_default())
}


#[cfg(test)]
mod tests {
    use super::strategies::chain;
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let roadmap = Roadmap::from_json(r#"{"steps":[{"id":1,"title":"A"}]}"#).unwrap();
        assert_eq!(roadmap.root, DEFAULT_ROOT);
        assert_eq!(roadmap.steps[0].status, StepStatus::Pending);
        assert!(roadmap.steps[0].substeps.is_empty());

        let empty = Roadmap::from_json("{}").unwrap();
        assert_eq!(empty.root, DEFAULT_ROOT);
        assert!(empty.steps.is_empty());
    }

    #[test]
    fn test_status_is_case_insensitive_and_lenient() {
        let roadmap = Roadmap::from_json(
            r#"{"root":"R","steps":[
                {"id":1,"title":"a","status":"DONE"},
                {"id":2,"title":"b","status":" Active "},
                {"id":3,"title":"c","status":"done/active/pending"},
                {"id":4,"title":"d","status":null},
                {"id":5,"title":"e","status":7}
            ]}"#,
        )
        .unwrap();

        let statuses: Vec<_> = roadmap.steps.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::Done,
                StepStatus::Active,
                StepStatus::Pending,
                StepStatus::Pending,
                StepStatus::Pending
            ]
        );
    }

    #[test]
    fn test_lenient_ids_and_titles() {
        let roadmap = Roadmap::from_json(
            r#"{"steps":[{"id":"7","title":42},{"id":"1.2"},{"id":3.0,"title":null},{"title":"x","substeps":null}]}"#,
        )
        .unwrap();

        assert_eq!(roadmap.steps[0].id, 7);
        assert_eq!(roadmap.steps[0].title, "42");
        assert_eq!(roadmap.steps[1].id, 0);
        assert_eq!(roadmap.steps[2].id, 3);
        assert_eq!(roadmap.steps[2].title, "");
        assert_eq!(roadmap.steps[3].id, 0);
        assert!(roadmap.steps[3].substeps.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let roadmap = Roadmap::from_json(r#"{"root":"R","owner":"me","steps":[{"id":1,"eta":"soon"}]}"#).unwrap();
        assert_eq!(roadmap.root, "R");
        assert_eq!(roadmap.steps.len(), 1);
    }

    #[test]
    fn test_structurally_wrong_payloads_fail() {
        assert!(Roadmap::from_json("[]").is_err());
        assert!(Roadmap::from_json(r#"{"steps":"none"}"#).is_err());
        assert!(Roadmap::from_json("null").is_err());
    }

    #[test]
    fn test_non_string_root_still_decodes() {
        let numeric = Roadmap::from_json(r#"{"root":2024,"steps":[{"id":1,"title":"A"}]}"#).unwrap();
        assert_eq!(numeric.root, "2024");
        assert_eq!(numeric.steps.len(), 1);

        assert_eq!(Roadmap::from_json(r#"{"root":true}"#).unwrap().root, "true");
        assert_eq!(Roadmap::from_json(r#"{"root":{"name":"x"}}"#).unwrap().root, DEFAULT_ROOT);
        assert_eq!(Roadmap::from_json(r#"{"root":null}"#).unwrap().root, DEFAULT_ROOT);
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(Roadmap::new("R", vec![]).depth(), 0);
        assert_eq!(chain(3).depth(), 3);

        let at_limit = serde_json::to_string(&chain(MAX_DEPTH)).unwrap();
        assert_eq!(Roadmap::from_json(&at_limit).unwrap(), chain(MAX_DEPTH));

        let too_deep = serde_json::to_string(&chain(MAX_DEPTH + 1)).unwrap();
        let err = Roadmap::from_json(&too_deep).unwrap_err();
        assert!(err.to_string().contains("levels deep"));
    }

    #[test]
    fn test_render_plan_is_preorder_in_source_order() {
        let roadmap = Roadmap::new(
            "R",
            vec![
                RoadmapNode::new(3, "c", StepStatus::Done).with_substeps(vec![
                    RoadmapNode::new(9, "c.1", StepStatus::Active)
                        .with_substeps(vec![RoadmapNode::new(1, "c.1.a", StepStatus::Pending)]),
                    RoadmapNode::new(2, "c.2", StepStatus::Pending),
                ]),
                RoadmapNode::new(1, "a", StepStatus::Pending),
                RoadmapNode::new(1, "a-again", StepStatus::Pending),
            ],
        );

        let plan: Vec<(usize, &str)> = render_plan(&roadmap)
            .iter()
            .map(|e| (e.depth, e.node.title.as_str()))
            .collect();

        assert_eq!(
            plan,
            vec![(0, "c"), (1, "c.1"), (2, "c.1.a"), (1, "c.2"), (0, "a"), (0, "a-again")]
        );
    }

    #[test]
    fn test_render_plan_empty() {
        assert!(render_plan(&Roadmap::new("R", vec![])).is_empty());
    }

    #[test]
    fn test_progress_counts_all_depths() {
        let roadmap = Roadmap::new(
            "R",
            vec![
                RoadmapNode::new(1, "a", StepStatus::Done).with_substeps(vec![
                    RoadmapNode::new(2, "b", StepStatus::Done),
                    RoadmapNode::new(3, "c", StepStatus::Active),
                ]),
                RoadmapNode::new(4, "d", StepStatus::Pending),
            ],
        );

        assert_eq!(roadmap.step_count(), 4);
        assert_eq!(
            roadmap.progress(),
            Progress {
                done: 2,
                active: 1,
                total: 4
            }
        );
    }

    #[test]
    fn test_model_replace_and_clear() {
        let mut model = RoadmapModel::new();
        assert!(model.is_empty());

        model.replace(Roadmap::new("first", vec![RoadmapNode::new(1, "a", StepStatus::Done)]));
        model.replace(Roadmap::new("second", vec![]));
        assert_eq!(model.current(), Some(&Roadmap::new("second", vec![])));

        model.clear();
        assert!(model.current().is_none());
    }

    #[test]
    fn test_serializes_status_lowercase() {
        let node = RoadmapNode::new(1, "a", StepStatus::Active);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["substeps"], serde_json::json!([]));
    }
}
