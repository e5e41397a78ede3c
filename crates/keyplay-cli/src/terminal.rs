//! Terminal views for the flows
//!
//! The spinner stands in for the busy submit button, panels print to stdout
//! in green or red, and the "player" just reports where a URL would go.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use keyplay_core::{
    choose_route, Playback, PlaybackRoute, ResponsePanel, SubmitButton, TextInput, Tone,
};
use std::cell::RefCell;
use std::time::Duration;

/// Plain-text busy label used instead of the page's spinner markup
pub const BUSY_LABEL: &str = "Processing...";

/// Value captured from the command line
#[derive(Default)]
pub struct ArgInput(RefCell<String>);

impl ArgInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self(RefCell::new(value.into()))
    }
}

impl TextInput for ArgInput {
    fn value(&self) -> String {
        self.0.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        *self.0.borrow_mut() = value.to_string();
    }
}

/// Spinner shown while the "button" is disabled
pub struct SpinnerButton {
    label: RefCell<String>,
    stash: RefCell<Option<String>>,
    spinner: RefCell<Option<ProgressBar>>,
}

impl SpinnerButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: RefCell::new(label.into()),
            stash: RefCell::new(None),
            spinner: RefCell::new(None),
        }
    }
}

impl SubmitButton for SpinnerButton {
    fn set_disabled(&self, disabled: bool) {
        let mut spinner = self.spinner.borrow_mut();
        if disabled {
            if spinner.is_none() {
                let bar = ProgressBar::new_spinner();
                if let Ok(template) = ProgressStyle::with_template("{spinner} {msg}") {
                    bar.set_style(template);
                }
                bar.set_message(self.label.borrow().clone());
                bar.enable_steady_tick(Duration::from_millis(100));
                *spinner = Some(bar);
            }
        } else if let Some(bar) = spinner.take() {
            bar.finish_and_clear();
        }
    }

    fn label(&self) -> String {
        self.label.borrow().clone()
    }

    fn set_label(&self, label: &str) {
        *self.label.borrow_mut() = label.to_string();
        if let Some(bar) = self.spinner.borrow().as_ref() {
            bar.set_message(label.to_string());
        }
    }

    fn stashed_label(&self) -> Option<String> {
        self.stash.borrow().clone()
    }

    fn stash_label(&self, label: Option<&str>) {
        *self.stash.borrow_mut() = label.map(str::to_string);
    }
}

/// Prints its content when made visible
pub struct PrintPanel {
    title: String,
    text: RefCell<String>,
    tone: RefCell<Tone>,
}

impl PrintPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: RefCell::new(String::new()),
            tone: RefCell::new(Tone::Failure),
        }
    }
}

impl ResponsePanel for PrintPanel {
    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    fn set_class(&self, class: &str) {
        let tone = if class == Tone::Success.panel_class() {
            Tone::Success
        } else {
            Tone::Failure
        };
        *self.tone.borrow_mut() = tone;
    }

    fn set_visible(&self, visible: bool) {
        if !visible {
            return;
        }
        let header = match *self.tone.borrow() {
            Tone::Success => style(format!("✓ {}", self.title)).green().bold(),
            Tone::Failure => style(format!("✗ {}", self.title)).red().bold(),
        };
        println!("{header}");
        println!("{}", self.text.borrow());
    }
}

/// Reports the playback route instead of playing
pub struct ReportPlayer {
    manifest_marker: String,
}

impl ReportPlayer {
    pub fn new(manifest_marker: impl Into<String>) -> Self {
        Self {
            manifest_marker: manifest_marker.into(),
        }
    }
}

impl Playback for ReportPlayer {
    fn start(&self, url: &str) -> PlaybackRoute {
        let route = choose_route(url, true, &self.manifest_marker);
        println!("{} {} ({route})", style("▶").cyan(), url);
        route
    }

    fn stop(&self) {
        tracing::debug!("Player stop requested");
    }
}
