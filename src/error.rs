//! Error types for component-update inference and deployment verification.

use serde_json::Value;
use thiserror::Error;

/// Main error type for component-update operations.
///
/// Every variant carries enough context (title, issue number, URL, status)
/// to diagnose the failure without re-running the request. Nothing is
/// retried or defaulted: callers treat any error as "could not process this
/// issue".
#[derive(Error, Debug)]
pub enum ComponentUpdateError {
    // Inference errors
    #[error("Could not guess component-update details from title '{title}'")]
    Extraction { title: String },

    #[error("Cannot determine release note from issue {number}")]
    Precondition { number: u64 },

    #[error("Could not determine URL from issue {number}")]
    Resolution { number: u64 },

    // Network/API errors
    #[error(
        "{method} {path} failed with status {status} ({status_message}): {body}"
    )]
    Transport {
        status: u16,
        status_message: String,
        method: String,
        path: String,
        body: String,
        json: Option<Value>,
    },

    #[error("Network request failed: {0}")]
    Connection(String),

    #[error("Invalid JSON: {0}")]
    Parse(String),

    #[error("Unexpected statusCode: {status} for {url}")]
    Probe { url: String, status: u16 },

    #[error("Could not parse URL {0}")]
    InvalidUrl(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias using ComponentUpdateError
pub type Result<T> = std::result::Result<T, ComponentUpdateError>;

impl ComponentUpdateError {
    /// Create an extraction error for the given issue title
    pub fn extraction(title: impl Into<String>) -> Self {
        Self::Extraction {
            title: title.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<reqwest::Error> for ComponentUpdateError {
    fn from(err: reqwest::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for ComponentUpdateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for ComponentUpdateError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<std::io::Error> for ComponentUpdateError {
    fn from(err: std::io::Error) -> Self {
        Self::InvalidConfig(format!("failed to read configuration: {err}"))
    }
}
