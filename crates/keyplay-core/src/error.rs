//! Error types for Keyplay Core

use thiserror::Error;

/// Result type alias for request and playback operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to a flow handler.
///
/// The `Display` output of each variant is exactly what ends up in the
/// response panel, so HTTP errors render the backend's own message.
#[derive(Error, Debug)]
pub enum Error {
    // Transport errors
    #[error("{0}")]
    Transport(String),

    // Backend errors
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Invalid JSON in response body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    // Request construction errors
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    // Player errors
    #[error("Streaming player error: {0}")]
    Player(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// HTTP status carried by the error, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Transport(_) => "TRANSPORT",
            Error::Http { .. } => "HTTP_STATUS",
            Error::InvalidBody(_) => "INVALID_BODY",
            Error::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Error::Encode(_) => "ENCODE",
            Error::Player(_) => "PLAYER",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
