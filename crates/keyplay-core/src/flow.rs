//! Form submission handlers
//!
//! Each flow owns its injected view handles, a shared [`ApiClient`] and an
//! [`InFlight`] tracker. A submit always supersedes the previous one for the
//! same form; the superseded request's reply is dropped unrendered.

use serde_json::{json, Value};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

use crate::{
    client::ApiClient,
    player::Playback,
    reply::{format_keys, DecodeOutcome, KeysOutcome},
    types::{DecodeRequest, KeysRequest, Tone},
    ui::{hide_response, set_loading, show_response, ResponsePanel, SubmitButton, TextInput},
    Error,
};

/// Generation counter for one form's requests
#[derive(Debug, Default)]
pub struct InFlight {
    generation: Cell<u64>,
}

/// Identifies one submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any earlier one
    pub fn begin(&self) -> Ticket {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        Ticket(next)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.get() == ticket.0
    }
}

/// How a submit ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Reply rendered with success styling
    Succeeded,
    /// Error or rejected reply rendered with failure styling
    Failed,
    /// A newer submit started first; nothing was rendered
    Superseded,
}

impl From<Tone> for SubmitStatus {
    fn from(tone: Tone) -> Self {
        match tone {
            Tone::Success => SubmitStatus::Succeeded,
            Tone::Failure => SubmitStatus::Failed,
        }
    }
}

/// Handles of the decode form
pub struct DecodeView {
    pub button: Rc<dyn SubmitButton>,
    pub token: Rc<dyn TextInput>,
    pub encrypted_url: Rc<dyn TextInput>,
    pub panel: Rc<dyn ResponsePanel>,
    /// Token field of the DRM form, pre-filled with a refreshed token
    pub forward_token: Rc<dyn TextInput>,
}

/// Handles of the DRM form
pub struct KeysView {
    pub button: Rc<dyn SubmitButton>,
    pub token: Rc<dyn TextInput>,
    pub video_url: Rc<dyn TextInput>,
    pub panel: Rc<dyn ResponsePanel>,
}

fn error_payload(error: &Error) -> Value {
    json!({ "error": error.to_string() })
}

/// Decode form handler
pub struct DecodeFlow {
    view: DecodeView,
    client: Rc<ApiClient>,
    player: Rc<dyn Playback>,
    busy_label: String,
    in_flight: InFlight,
}

impl DecodeFlow {
    pub fn new(
        view: DecodeView,
        client: Rc<ApiClient>,
        player: Rc<dyn Playback>,
        busy_label: impl Into<String>,
    ) -> Self {
        Self {
            view,
            client,
            player,
            busy_label: busy_label.into(),
            in_flight: InFlight::new(),
        }
    }

    /// Run one submit to completion
    #[instrument(skip(self), name = "decode_submit")]
    pub async fn submit(&self) -> SubmitStatus {
        let ticket = self.in_flight.begin();
        let view = &self.view;

        set_loading(view.button.as_ref(), true, &self.busy_label);
        hide_response(view.panel.as_ref());
        self.player.stop();

        let request = DecodeRequest::new(view.token.value(), view.encrypted_url.value());
        let result = self.client.decode(&request).await;

        if !self.in_flight.is_current(ticket) {
            debug!("Decode reply superseded by a newer submit");
            return SubmitStatus::Superseded;
        }

        let status = match result {
            Ok(reply) => {
                let tone = reply.tone();
                show_response(view.panel.as_ref(), &reply.raw, tone);

                if let DecodeOutcome::Playable { url, next_token } = &reply.outcome {
                    let route = self.player.start(url);
                    info!(route = %route, "Decoded URL handed to player");
                    if let Some(token) = next_token {
                        info!("Forwarding refreshed token to DRM form");
                        view.forward_token.set_value(token);
                    }
                }
                SubmitStatus::from(tone)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Decode failed");
                show_response(view.panel.as_ref(), &error_payload(&e), Tone::Failure);
                SubmitStatus::Failed
            }
        };

        set_loading(view.button.as_ref(), false, &self.busy_label);
        status
    }
}

/// DRM form handler
pub struct KeysFlow {
    view: KeysView,
    client: Rc<ApiClient>,
    busy_label: String,
    in_flight: InFlight,
}

impl KeysFlow {
    pub fn new(view: KeysView, client: Rc<ApiClient>, busy_label: impl Into<String>) -> Self {
        Self {
            view,
            client,
            busy_label: busy_label.into(),
            in_flight: InFlight::new(),
        }
    }

    /// Run one submit to completion
    #[instrument(skip(self), name = "keys_submit")]
    pub async fn submit(&self) -> SubmitStatus {
        let ticket = self.in_flight.begin();
        let view = &self.view;

        set_loading(view.button.as_ref(), true, &self.busy_label);
        hide_response(view.panel.as_ref());

        let request = KeysRequest::new(view.token.value(), view.video_url.value());
        let result = self.client.get_keys(&request).await;

        if !self.in_flight.is_current(ticket) {
            debug!("Key reply superseded by a newer submit");
            return SubmitStatus::Superseded;
        }

        let status = match result {
            Ok(reply) => match &reply.outcome {
                KeysOutcome::Keys { mpd_url, keys } => {
                    info!(count = keys.len(), "Keys retrieved");
                    let text = format_keys(mpd_url, keys);
                    show_response(view.panel.as_ref(), &Value::String(text), Tone::Success);
                    SubmitStatus::Succeeded
                }
                KeysOutcome::Rejected => {
                    show_response(view.panel.as_ref(), &reply.raw, Tone::Failure);
                    SubmitStatus::Failed
                }
            },
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Key retrieval failed");
                show_response(view.panel.as_ref(), &error_payload(&e), Tone::Failure);
                SubmitStatus::Failed
            }
        };

        set_loading(view.button.as_ref(), false, &self.busy_label);
        status
    }
}
