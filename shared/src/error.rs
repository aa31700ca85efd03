//! Error types for the feedback endpoint.

use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum characters of upstream error text forwarded to the caller.
pub const DETAIL_LIMIT: usize = 300;
/// Maximum characters of unparseable model text forwarded to the caller.
pub const RAW_LIMIT: usize = 400;
/// Maximum characters of the serialized provider envelope forwarded to the caller.
pub const PREVIEW_LIMIT: usize = 800;

/// Errors that can terminate a feedback request.
#[derive(Error, Debug)]
pub enum Error {
    /// Anything other than POST or OPTIONS
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Origin header missing or not on the allow-list
    #[error("Origin not allowed: {}", .0.as_deref().unwrap_or("<none>"))]
    OriginNotAllowed(Option<String>),

    /// Request body is not JSON
    #[error("Invalid JSON")]
    InvalidJson,

    /// Request body is JSON but fails a bound check
    #[error("Validation error: {0}")]
    Validation(String),

    /// Deployment configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider answered with a non-success status
    #[error("Upstream returned status {status}")]
    Upstream { status: u16, detail: String },

    /// Provider could not be reached at all
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// Provider answered but the model text is not JSON
    #[error("Model returned non-JSON")]
    NonJsonModel { raw: String, preview: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build an upstream error, keeping only a bounded excerpt of the provider's text.
    pub fn upstream(status: u16, body: &str) -> Self {
        Error::Upstream {
            status,
            detail: truncate(body, DETAIL_LIMIT),
        }
    }

    /// Build a transport error, keeping only a bounded excerpt of the failure text.
    pub fn transport(message: impl AsRef<str>) -> Self {
        Error::Transport(truncate(message.as_ref(), DETAIL_LIMIT))
    }

    /// Build a contract violation from the extracted text and the whole envelope.
    pub fn non_json(raw: &str, envelope: &Value) -> Self {
        let serialized = serde_json::to_string(envelope).unwrap_or_default();
        Error::NonJsonModel {
            raw: truncate(raw, RAW_LIMIT),
            preview: truncate(&serialized, PREVIEW_LIMIT),
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MethodNotAllowed => 405,
            Error::OriginNotAllowed(_) => 403,
            Error::InvalidJson | Error::Validation(_) => 400,
            Error::Upstream { .. } | Error::Transport(_) => 502,
            Error::Config(_) | Error::NonJsonModel { .. } | Error::Serialization(_) => 500,
        }
    }

    /// JSON body returned to the caller.
    pub fn body(&self) -> Value {
        match self {
            Error::MethodNotAllowed => json!({ "error": "Method Not Allowed" }),
            Error::OriginNotAllowed(origin) => json!({
                "error": "Origin not allowed",
                "origin": origin,
            }),
            Error::InvalidJson => json!({ "error": "Invalid JSON" }),
            Error::Validation(message) | Error::Config(message) => json!({ "error": message }),
            Error::Upstream { detail, .. } => json!({
                "error": "OpenAI error",
                "detail": detail,
            }),
            Error::Transport(detail) => json!({
                "error": "OpenAI request failed",
                "detail": detail,
            }),
            Error::NonJsonModel { raw, preview } => json!({
                "error": "Model returned non-JSON",
                "raw": raw,
                "openai_response_preview": preview,
            }),
            Error::Serialization(_) => json!({ "error": "Internal error" }),
        }
    }
}

/// Keep at most `max` characters of `text`, never splitting a character.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
