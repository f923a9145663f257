//! Request builder - turns the conversation into a wire request
//!
//! Pure data transformation: no I/O, no clock, no randomness. The same
//! conversation always produces the same request.

use tracing::debug;

use crate::conversation::Conversation;
use crate::extract::ROADMAP_FENCE_TAG;
use crate::llm::{CompletionRequest, GenerationParams};

/// Fixed behavior directive sent as the system instruction
pub const BEHAVIOR_DIRECTIVE: &str = include_str!("../prompts/architect.pmt");

/// Build the request for the next model call
///
/// The conversation must already hold the new user turn.
pub fn build_request(conversation: &Conversation) -> CompletionRequest {
    debug!(turn_count = conversation.len(), "build_request: called");
    CompletionRequest {
        system_instruction: BEHAVIOR_DIRECTIVE.to_string(),
        contents: conversation.to_request_format(),
        generation: GenerationParams::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Turn;
    use crate::llm::{MAX_OUTPUT_TOKENS, Message, TEMPERATURE, TOP_P};

    #[test]
    fn test_directive_carries_roadmap_contract() {
        assert!(BEHAVIOR_DIRECTIVE.contains(&format!("```{}", ROADMAP_FENCE_TAG)));
        assert!(BEHAVIOR_DIRECTIVE.contains("\"substeps\""));
        assert!(BEHAVIOR_DIRECTIVE.contains("very last element"));
    }

    #[test]
    fn test_directive_carries_language_rules() {
        assert!(BEHAVIOR_DIRECTIVE.contains("Persian"));
        assert!(BEHAVIOR_DIRECTIVE.contains("Polish"));
        assert!(BEHAVIOR_DIRECTIVE.contains("left-to-right"));
    }

    #[test]
    fn test_build_request_snapshot() {
        let conversation = Conversation::from(vec![
            Turn::user("سلام"),
            Turn::model("درود"),
            Turn::user("یک برنامه بساز"),
        ]);

        let request = build_request(&conversation);

        let expected = CompletionRequest {
            system_instruction: BEHAVIOR_DIRECTIVE.to_string(),
            contents: vec![
                Message::user("سلام"),
                Message::model("درود"),
                Message::user("یک برنامه بساز"),
            ],
            generation: GenerationParams {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };
        assert_eq!(request, expected);
    }

    #[test]
    fn test_build_request_is_deterministic() {
        let conversation = Conversation::from(vec![Turn::user("a")]);
        assert_eq!(build_request(&conversation), build_request(&conversation));
    }
}
