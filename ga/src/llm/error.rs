//! LLM error types

use thiserror::Error;

/// Errors that can occur while talking to the model endpoint
///
/// Every variant renders as a plain message that is shown to the user as-is.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The endpoint answered with an error payload
    #[error("{message}")]
    Endpoint { status: Option<u16>, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key not found. Set the {0} environment variable.")]
    MissingApiKey(String),
}

impl LlmError {
    /// HTTP status reported alongside the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Endpoint { status, .. } => *status,
            LlmError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the endpoint itself rejected the request
    pub fn is_endpoint_error(&self) -> bool {
        matches!(self, LlmError::Endpoint { .. })
    }
}
