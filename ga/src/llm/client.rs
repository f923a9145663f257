//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, LlmError};

/// Narrow transport contract: one request in, one reply text out
///
/// Implementations perform no retries. A failure must come back as an
/// `LlmError`, never as a success carrying malformed text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single request and wait for the full reply text
    async fn send(&self, request: CompletionRequest) -> Result<String, LlmError>;
}
