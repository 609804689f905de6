// Error taxonomy for the client.
// Each stage has its own error type so callers can tell recoverable
// failures (bad input, a rejected encode) from fatal ones (bad config,
// failed login, a broken connection). `ClientError` is what can escape
// the interactive flow.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Settings could not be loaded or are incomplete. Always raised before
/// any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid ApiSettings.BaseUrl '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Status(StatusCode),

    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("auth request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    /// Rejected locally; no request was sent.
    #[error("No input provided")]
    InvalidInput,

    #[error("Encoding failed: {0}")]
    Status(StatusCode),

    #[error("Encoding failed: malformed response: {0}")]
    MalformedResponse(String),

    #[error("encode request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl EncodeError {
    /// Whether the interactive loop can report this and keep going.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EncodeError::Transport(_))
    }
}

/// Top-level error for a client run.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("console I/O failed: {0}")]
    Console(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
