//! Request payloads and shared value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP method used by the request helper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    #[default]
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(format!("unsupported method: {other}")),
        }
    }
}

/// Body of a decode call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeRequest {
    pub token: String,
    pub encrypted_url: String,
}

impl DecodeRequest {
    pub fn new(token: impl Into<String>, encrypted_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            encrypted_url: encrypted_url.into(),
        }
    }
}

/// Body of a key-retrieval call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysRequest {
    pub token: String,
    pub video_url: String,
}

impl KeysRequest {
    pub fn new(token: impl Into<String>, video_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            video_url: video_url.into(),
        }
    }
}

/// Visual variant of a response panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
}

impl Tone {
    pub fn from_success(success: bool) -> Self {
        if success {
            Tone::Success
        } else {
            Tone::Failure
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Tone::Success)
    }
}

/// Which playback path the player controller took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackRoute {
    /// Manifest loaded through the adaptive-streaming engine
    Streaming,
    /// Source assigned directly to the media element
    Native,
}

impl fmt::Display for PlaybackRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackRoute::Streaming => write!(f, "streaming"),
            PlaybackRoute::Native => write!(f, "native"),
        }
    }
}
