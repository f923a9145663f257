//! LLM request types for the architect client
//!
//! These types model the Gemini `generateContent` API closely enough to map
//! one-to-one onto the wire, while staying independent of the HTTP layer.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed sampling temperature
pub const TEMPERATURE: f32 = 0.7;

/// Fixed nucleus-sampling cutoff
pub const TOP_P: f32 = 0.95;

/// Fixed upper bound on reply length
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System-level behavior directive, sent apart from the turns
    pub system_instruction: String,

    /// Conversation turns in transport role vocabulary, oldest first
    pub contents: Vec<Message>,

    /// Sampling parameters
    pub generation: GenerationParams,
}

/// Sampling parameters attached to every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// A message in transport form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            role: Role::User,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Create a model message with text content
    pub fn model(text: impl Into<String>) -> Self {
        debug!("Message::model: called");
        Self {
            role: Role::Model,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Concatenated text of all parts
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// Transport role vocabulary - exactly two roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A single text part of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_user() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "Hello");
    }

    #[test]
    fn test_message_model() {
        let msg = Message::model("Hi there");
        assert_eq!(msg.role, Role::Model);
        assert_eq!(msg.parts.len(), 1);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(Message::model("x")).unwrap();
        assert_eq!(json["role"], "model");
        assert_eq!(json["parts"][0]["text"], "x");
    }

    #[test]
    fn test_generation_params_wire_names() {
        let json = serde_json::to_value(GenerationParams::default()).unwrap();
        assert_eq!(json["maxOutputTokens"], 8192);
        assert!((json["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }
}
