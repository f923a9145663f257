//! Google Gemini API client implementation
//!
//! Implements the LlmClient trait for the `generateContent` endpoint.
//! One HTTP call per request, no retries and no streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionRequest, LlmClient, LlmError};
use crate::config::LlmConfig;

/// Gemini `generateContent` client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "from_config: called");
        let api_key = config
            .get_api_key()
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(model = %self.model, turns = request.contents.len(), "build_request_body: called");
        serde_json::json!({
            "contents": request.contents,
            "systemInstruction": {
                "parts": [{ "text": request.system_instruction }],
            },
            "generationConfig": request.generation,
        })
    }
}

/// Turn an HTTP status and body into reply text or an error
///
/// An error payload wins over everything else. A success without any
/// candidate text is reported as an invalid response.
fn parse_reply(status: u16, body: &str) -> Result<String, LlmError> {
    debug!(status, body_len = body.len(), "parse_reply: called");
    let parsed: GeminiResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            if (200..300).contains(&status) {
                debug!(error = %e, "parse_reply: undecodable success body");
                return Err(LlmError::InvalidResponse(e.to_string()));
            }
            debug!("parse_reply: undecodable error body");
            let message = if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            };
            return Err(LlmError::Endpoint {
                status: Some(status),
                message,
            });
        }
    };

    if let Some(error) = parsed.error {
        debug!(code = ?error.code, "parse_reply: endpoint error payload");
        return Err(LlmError::Endpoint {
            status: error.code.or(Some(status)),
            message: error.message,
        });
    }

    if !(200..300).contains(&status) {
        debug!(status, "parse_reply: non-success status without payload");
        return Err(LlmError::Endpoint {
            status: Some(status),
            message: format!("HTTP {}", status),
        });
    }

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<String>());

    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("Request blocked: {}", r))
                .unwrap_or_else(|| "Model returned no text".to_string());
            warn!(%reason, "parse_reply: empty reply");
            Err(LlmError::InvalidResponse(reason))
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn send(&self, request: CompletionRequest) -> Result<String, LlmError> {
        debug!(model = %self.model, "send: called");
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.clone())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(status, "send: response received");
        parse_reply(status, &text)
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}
