//! LLM Client module for the architect
//!
//! Provides the transport contract and its Gemini implementation.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, GenerationParams, MAX_OUTPUT_TOKENS, Message, Part, Role, TEMPERATURE, TOP_P};

use crate::config::LlmConfig;

/// Create the LLM client described by config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(model = %config.model, "create_client: called");
    Ok(Arc::new(GeminiClient::from_config(config)?))
}
