//! Conversation history - the ordered log of dialogue turns
//!
//! This is the source of truth for what gets replayed to the model. Turns are
//! append-only; the only ways to shrink the log are `reset`, `replace` (on
//! snapshot load) and `truncate` (rolling back a failed submission).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{Message, Role};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    #[serde(alias = "assistant")]
    Model,
}

impl Speaker {
    /// Map to the transport's role vocabulary
    pub fn to_role(self) -> Role {
        match self {
            Speaker::User => Role::User,
            Speaker::Model => Role::Model,
        }
    }
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Speaker,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::Model,
            content: content.into(),
        }
    }
}

/// Ordered, append-only sequence of turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn at the end
    pub fn append(&mut self, turn: Turn) {
        debug!(role = ?turn.role, content_len = turn.content.len(), "Conversation::append: called");
        self.turns.push(turn);
    }

    /// Turns in creation order, mapped into transport messages
    pub fn to_request_format(&self) -> Vec<Message> {
        debug!(turn_count = self.turns.len(), "Conversation::to_request_format: called");
        self.turns
            .iter()
            .map(|turn| match turn.role.to_role() {
                Role::User => Message::user(turn.content.clone()),
                Role::Model => Message::model(turn.content.clone()),
            })
            .collect()
    }

    /// Drop every turn
    pub fn reset(&mut self) {
        debug!(turn_count = self.turns.len(), "Conversation::reset: called");
        self.turns.clear();
    }

    /// Swap in a whole history (snapshot load)
    pub fn replace(&mut self, turns: Vec<Turn>) {
        debug!(turn_count = turns.len(), "Conversation::replace: called");
        self.turns = turns;
    }

    /// Roll back to an earlier length; longer lengths are a no-op
    pub fn truncate(&mut self, len: usize) {
        debug!(from = self.turns.len(), to = len, "Conversation::truncate: called");
        self.turns.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_conversation_maps_to_nothing() {
        let conversation = Conversation::new();
        assert!(conversation.to_request_format().is_empty());
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_consecutive_same_role_turns_are_kept() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("a"));
        conversation.append(Turn::user("a"));

        let messages = conversation.to_request_format();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.role == Role::User));
    }

    #[test]
    fn test_reset_and_replace() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("hello"));
        conversation.reset();
        assert!(conversation.is_empty());

        conversation.replace(vec![Turn::user("x"), Turn::model("y")]);
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.last(), Some(&Turn::model("y")));
    }

    #[test]
    fn test_truncate_rolls_back() {
        let mut conversation = Conversation::from(vec![Turn::user("a"), Turn::model("b")]);
        conversation.append(Turn::user("c"));
        conversation.truncate(2);
        assert_eq!(conversation.turns(), &[Turn::user("a"), Turn::model("b")]);

        conversation.truncate(10);
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_assistant_alias_deserializes_as_model() {
        let turn: Turn = serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(turn.role, Speaker::Model);
        assert_eq!(serde_json::to_value(&turn).unwrap()["role"], "model");
    }

    fn turn_strategy() -> impl Strategy<Value = Turn> {
        (any::<bool>(), ".{0,40}").prop_map(|(is_user, content)| {
            if is_user { Turn::user(content) } else { Turn::model(content) }
        })
    }

    proptest! {
        #[test]
        fn request_format_preserves_order_and_roles(turns in prop::collection::vec(turn_strategy(), 0..30)) {
            let mut conversation = Conversation::new();
            for turn in &turns {
                conversation.append(turn.clone());
            }

            let messages = conversation.to_request_format();
            prop_assert_eq!(messages.len(), turns.len());
            for (message, turn) in messages.iter().zip(&turns) {
                prop_assert_eq!(message.role, turn.role.to_role());
                prop_assert_eq!(message.text(), turn.content.clone());
            }
        }
    }
}
