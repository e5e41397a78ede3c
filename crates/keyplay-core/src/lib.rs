//! Keyplay Core - decode and key-retrieval flows
//!
//! This crate holds everything that does not depend on where it runs:
//! - JSON request helper over a pluggable [`Transport`]
//! - Parsing of backend replies into tagged outcomes
//! - Busy-state and response-panel helpers over view traits
//! - Player control with single ownership of the streaming session
//! - The decode and DRM form handlers
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Keyplay Core                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │   ┌────────────┐        ┌────────────┐                       │
//! │   │ DecodeFlow │        │  KeysFlow  │   <- injected views   │
//! │   └─────┬──┬───┘        └─────┬──────┘                       │
//! │         │  │                  │                              │
//! │         │  └──────────┬───────┘                              │
//! │   ┌─────┴──────┐ ┌────┴──────┐   ┌───────────┐               │
//! │   │   Player   │ │ ApiClient ├──>│ Transport │ fetch/reqwest │
//! │   │ Controller │ └───────────┘   └───────────┘               │
//! │   └─────┬──────┘                                             │
//! │   ┌─────┴──────────┐                                         │
//! │   │StreamingEngine │ hls.js                                  │
//! │   └────────────────┘                                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod player;
pub mod reply;
pub mod types;
pub mod ui;

pub use client::{ApiClient, HttpRequest, HttpResponse, Transport, JSON_CONTENT_TYPE};
pub use config::{AppConfig, ElementIds, PROCESSING_LABEL};
pub use error::{Error, Result};
pub use flow::{DecodeFlow, DecodeView, InFlight, KeysFlow, KeysView, SubmitStatus, Ticket};
pub use player::{
    choose_route, ManifestReady, Playback, PlayerController, StreamingEngine, StreamingSession,
    VideoSurface,
};
pub use reply::{format_keys, DecodeOutcome, DecodeReply, KeysOutcome, KeysReply};
pub use types::*;
pub use ui::{
    hide_response, render_value, set_loading, show_response, ResponsePanel, SubmitButton,
    TextInput,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
