//! Backend replies parsed into tagged outcomes
//!
//! The backend answers with loosely shaped JSON. Each reply is parsed once
//! into an outcome enum; handlers match on the outcome and never poke at the
//! raw value again, except to render it.

use serde_json::Value;

use crate::types::Tone;

/// JavaScript truthiness of a JSON value.
///
/// `null`, `false`, `0`, `NaN` and `""` are falsy; every array and object,
/// including empty ones, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Truthiness of `value[key]`, absent keys being falsy
pub fn field_truthy(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(is_truthy)
}

/// A truthy string field, or `None`
fn truthy_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// JavaScript `String(value)` of a JSON value.
///
/// Arrays join their elements with `,` the way `Array.prototype.join` does,
/// so `null` elements turn into empty strings. Integral floats print without
/// a fractional part.
pub fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(join_element).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// One element as `Array.prototype.join` renders it
fn join_element(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => js_string(other),
    }
}

/// Message for a non-success status: `error`, then `details`, then a
/// fallback embedding the status code.
pub fn error_message(body: &Value, status: u16) -> String {
    ["error", "details"]
        .iter()
        .filter_map(|key| body.get(*key).filter(|v| is_truthy(v)))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .next()
        .unwrap_or_else(|| format!("HTTP Error: {status}"))
}

/// Outcome of a decode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Backend produced a URL to play, possibly with a fresh token
    Playable {
        url: String,
        next_token: Option<String>,
    },
    /// Reported success without anything to play
    Accepted,
    /// Reported a logical failure
    Rejected,
}

/// Parsed decode reply
#[derive(Debug, Clone)]
pub struct DecodeReply {
    /// Body exactly as received
    pub raw: Value,
    pub outcome: DecodeOutcome,
}

impl DecodeReply {
    pub fn parse(raw: Value) -> Self {
        let outcome = if !field_truthy(&raw, "success") {
            DecodeOutcome::Rejected
        } else if let Some(url) = truthy_str(&raw, "url") {
            let next_token = raw
                .get("new_token_info")
                .and_then(|info| truthy_str(info, "token"))
                .map(str::to_string);
            DecodeOutcome::Playable {
                url: url.to_string(),
                next_token,
            }
        } else {
            DecodeOutcome::Accepted
        };

        Self { raw, outcome }
    }

    /// Panel tone follows the backend's own `success` flag
    pub fn tone(&self) -> Tone {
        Tone::from_success(!matches!(self.outcome, DecodeOutcome::Rejected))
    }
}

/// Outcome of a key-retrieval call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeysOutcome {
    Keys { mpd_url: String, keys: Vec<String> },
    Rejected,
}

/// Parsed key-retrieval reply
#[derive(Debug, Clone)]
pub struct KeysReply {
    pub raw: Value,
    pub outcome: KeysOutcome,
}

impl KeysReply {
    pub fn parse(raw: Value) -> Self {
        let keys = if field_truthy(&raw, "success") && field_truthy(&raw, "data") {
            raw.get("data")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(join_element).collect::<Vec<_>>())
        } else {
            None
        };

        let outcome = match keys {
            Some(keys) => KeysOutcome::Keys {
                // interpolated as-is: an absent field reads "undefined"
                mpd_url: raw
                    .get("mpd_url")
                    .map(js_string)
                    .unwrap_or_else(|| "undefined".to_string()),
                keys,
            },
            None => KeysOutcome::Rejected,
        };

        Self { raw, outcome }
    }
}

/// Plain-text block shown for a successful key retrieval
pub fn format_keys(mpd_url: &str, keys: &[String]) -> String {
    format!("MPD URL:\n{}\n\nKEYS:\n{}", mpd_url, keys.join("\n"))
}
