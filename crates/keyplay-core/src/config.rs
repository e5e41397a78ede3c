//! Application configuration
//!
//! Every field has a default matching the stock page, so an empty JSON
//! object (or no config at all) yields a working setup.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Busy label swapped into a submit button while its request runs
pub const PROCESSING_LABEL: &str =
    r#"<span class="spinner-border spinner-border-sm me-1"></span>Processing..."#;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Path of the decode endpoint
    pub decode_endpoint: String,
    /// Path of the key-retrieval endpoint
    pub keys_endpoint: String,
    /// Substring marking a URL as an adaptive-streaming manifest
    pub manifest_marker: String,
    /// Label shown on a busy submit button
    pub processing_label: String,
    /// Element ids of the page
    pub elements: ElementIds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            decode_endpoint: "/api/decode".to_string(),
            keys_endpoint: "/api/get-keys".to_string(),
            manifest_marker: ".m3u8".to_string(),
            processing_label: PROCESSING_LABEL.to_string(),
            elements: ElementIds::default(),
        }
    }
}

impl AppConfig {
    /// Parse from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would break request routing
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("decodeEndpoint", &self.decode_endpoint),
            ("keysEndpoint", &self.keys_endpoint),
        ] {
            if !path.starts_with('/') {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be an absolute path, got {path:?}"
                )));
            }
        }
        if self.manifest_marker.is_empty() {
            return Err(Error::InvalidConfig("manifestMarker must not be empty".into()));
        }
        Ok(())
    }
}

/// DOM element ids the browser binding resolves at mount time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub decode_form: String,
    pub decode_token: String,
    pub encrypted_url: String,
    pub decode_response: String,
    pub decode_response_content: String,
    pub drm_form: String,
    pub drm_token: String,
    pub video_url: String,
    pub drm_response: String,
    pub drm_response_content: String,
    pub video_container: String,
    pub video_player: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            decode_form: "decodeForm".into(),
            decode_token: "token".into(),
            encrypted_url: "encryptedUrl".into(),
            decode_response: "decodeResponse".into(),
            decode_response_content: "decodeResponseContent".into(),
            drm_form: "drmForm".into(),
            drm_token: "drmToken".into(),
            video_url: "videoUrl".into(),
            drm_response: "drmResponse".into(),
            drm_response_content: "drmResponseContent".into(),
            video_container: "videoContainer".into(),
            video_player: "videoPlayer".into(),
        }
    }
}
