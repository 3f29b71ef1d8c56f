//! Error types for chatline.

use thiserror::Error;

/// Longest slice of a response body carried into an [`ChatlineError::Api`] message.
const MAX_BODY_CHARS: usize = 512;

/// Primary error type for all chatline operations.
#[derive(Error, Debug)]
pub enum ChatlineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ChatlineError {
    /// Create an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error came from the HTTP exchange itself (status, connection, body).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Network(_) | Self::Stream(_))
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Map a non-success HTTP status and its body into an error.
pub fn status_to_error(status: u16, body: &str) -> ChatlineError {
    let body = body.trim();
    let message = if body.is_empty() {
        format!("HTTP error! status: {status}")
    } else if body.chars().count() > MAX_BODY_CHARS {
        let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
        format!("{truncated}...")
    } else {
        body.to_string()
    };
    ChatlineError::api(status, message)
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ChatlineError>;
