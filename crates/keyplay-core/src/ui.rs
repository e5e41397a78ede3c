//! View seams and UI feedback helpers
//!
//! Handlers never look elements up by id. They receive handles implementing
//! the traits below; the browser binding implements them over `web-sys`
//! elements, the terminal client over stdout.

use serde_json::Value;

use crate::types::Tone;

/// Panel class for a successful reply
pub const SUCCESS_CLASS: &str = "mt-4 p-3 rounded bg-success-subtle text-success-emphasis";
/// Panel class for a failed reply
pub const FAILURE_CLASS: &str = "mt-4 p-3 rounded bg-danger-subtle text-danger-emphasis";

/// A single-line text input
pub trait TextInput {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
}

/// A submit button with a stashable label
pub trait SubmitButton {
    fn set_disabled(&self, disabled: bool);
    fn label(&self) -> String;
    fn set_label(&self, label: &str);
    /// Label saved while busy, if any
    fn stashed_label(&self) -> Option<String>;
    fn stash_label(&self, label: Option<&str>);
}

/// A response panel with a content area
pub trait ResponsePanel {
    fn set_text(&self, text: &str);
    fn set_class(&self, class: &str);
    fn set_visible(&self, visible: bool);
}

impl Tone {
    pub fn panel_class(&self) -> &'static str {
        match self {
            Tone::Success => SUCCESS_CLASS,
            Tone::Failure => FAILURE_CLASS,
        }
    }
}

/// Toggle a button's busy state, keeping its original label across the cycle.
///
/// Marking an already busy button busy again keeps the first stashed label.
pub fn set_loading(button: &dyn SubmitButton, loading: bool, busy_label: &str) {
    if loading {
        button.set_disabled(true);
        if button.stashed_label().is_none() {
            button.stash_label(Some(&button.label()));
        }
        button.set_label(busy_label);
    } else {
        button.set_disabled(false);
        if let Some(original) = button.stashed_label() {
            button.set_label(&original);
            button.stash_label(None);
        }
    }
}

/// Text for a panel: strings pass through, anything else is pretty JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Render `value` into the panel with the given tone and reveal it
pub fn show_response(panel: &dyn ResponsePanel, value: &Value, tone: Tone) {
    panel.set_text(&render_value(value));
    panel.set_class(tone.panel_class());
    panel.set_visible(true);
}

/// Hide the panel, leaving its content in place
pub fn hide_response(panel: &dyn ResponsePanel) {
    panel.set_visible(false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROCESSING_LABEL;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Button {
        disabled: Cell<bool>,
        label: RefCell<String>,
        stash: RefCell<Option<String>>,
    }

    impl SubmitButton for Button {
        fn set_disabled(&self, disabled: bool) {
            self.disabled.set(disabled);
        }
        fn label(&self) -> String {
            self.label.borrow().clone()
        }
        fn set_label(&self, label: &str) {
            *self.label.borrow_mut() = label.to_string();
        }
        fn stashed_label(&self) -> Option<String> {
            self.stash.borrow().clone()
        }
        fn stash_label(&self, label: Option<&str>) {
            *self.stash.borrow_mut() = label.map(str::to_string);
        }
    }

    #[test]
    fn test_loading_cycle_restores_label() {
        let button = Button::default();
        button.set_label("Decode & Play");

        set_loading(&button, true, PROCESSING_LABEL);
        assert!(button.disabled.get());
        assert_eq!(button.label(), PROCESSING_LABEL);

        set_loading(&button, false, PROCESSING_LABEL);
        assert!(!button.disabled.get());
        assert_eq!(button.label(), "Decode & Play");
        assert!(button.stashed_label().is_none());
    }

    #[test]
    fn test_double_busy_keeps_first_label() {
        let button = Button::default();
        button.set_label("Get Keys");

        set_loading(&button, true, PROCESSING_LABEL);
        set_loading(&button, true, PROCESSING_LABEL);
        set_loading(&button, false, PROCESSING_LABEL);
        assert_eq!(button.label(), "Get Keys");
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("plain")), "plain");
        assert_eq!(render_value(&json!({ "error": "x" })), "{\n  \"error\": \"x\"\n}");
    }

    #[test]
    fn test_render_value_keeps_backend_key_order() {
        let value: Value =
            serde_json::from_str(r#"{"success":false,"error":"No keys found","code":7}"#).unwrap();
        assert_eq!(
            render_value(&value),
            "{\n  \"success\": false,\n  \"error\": \"No keys found\",\n  \"code\": 7\n}"
        );
    }
}
