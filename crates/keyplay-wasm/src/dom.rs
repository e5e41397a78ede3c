//! DOM-backed views
//!
//! Elements are looked up once, at mount time, and wrapped in handles that
//! implement the view traits of `keyplay-core`.

use keyplay_core::{ResponsePanel, SubmitButton, TextInput, VideoSurface};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlVideoElement};

/// `data-*` key holding a busy button's original label
const ORIGINAL_LABEL_KEY: &str = "originalText";

/// Look up an element by id and cast it
pub fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("element #{id} not found")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has an unexpected type")))
}

fn set_display(element: &HtmlElement, visible: bool) {
    let value = if visible { "block" } else { "none" };
    if element.style().set_property("display", value).is_err() {
        tracing::warn!(id = %element.id(), "Failed to set display");
    }
}

/// Text input
pub struct DomInput(pub HtmlInputElement);

impl TextInput for DomInput {
    fn value(&self) -> String {
        self.0.value()
    }

    fn set_value(&self, value: &str) {
        self.0.set_value(value);
    }
}

/// A form's submit button; the original label lives in `data-original-text`
pub struct DomButton(HtmlButtonElement);

impl DomButton {
    /// First `button[type="submit"]` inside `form`
    pub fn in_form(form: &HtmlFormElement) -> Result<Self, JsValue> {
        form.query_selector(r#"button[type="submit"]"#)?
            .ok_or_else(|| JsValue::from_str(&format!("form #{} has no submit button", form.id())))?
            .dyn_into::<HtmlButtonElement>()
            .map(Self)
            .map_err(|_| JsValue::from_str("submit control is not a button"))
    }
}

impl SubmitButton for DomButton {
    fn set_disabled(&self, disabled: bool) {
        self.0.set_disabled(disabled);
    }

    fn label(&self) -> String {
        self.0.inner_html()
    }

    fn set_label(&self, label: &str) {
        self.0.set_inner_html(label);
    }

    fn stashed_label(&self) -> Option<String> {
        self.0.dataset().get(ORIGINAL_LABEL_KEY)
    }

    fn stash_label(&self, label: Option<&str>) {
        let dataset = self.0.dataset();
        match label {
            Some(label) => {
                if dataset.set(ORIGINAL_LABEL_KEY, label).is_err() {
                    tracing::warn!("Failed to stash button label");
                }
            }
            None => dataset.delete(ORIGINAL_LABEL_KEY),
        }
    }
}

/// Response panel: outer box plus the element holding the text
pub struct DomPanel {
    root: HtmlElement,
    content: HtmlElement,
}

impl DomPanel {
    pub fn new(root: HtmlElement, content: HtmlElement) -> Self {
        Self { root, content }
    }
}

impl ResponsePanel for DomPanel {
    fn set_text(&self, text: &str) {
        self.content.set_text_content(Some(text));
    }

    fn set_class(&self, class: &str) {
        self.root.set_class_name(class);
    }

    fn set_visible(&self, visible: bool) {
        set_display(&self.root, visible);
    }
}

/// Video element and its container
#[derive(Clone)]
pub struct DomVideo {
    container: HtmlElement,
    video: HtmlVideoElement,
}

impl DomVideo {
    pub fn new(container: HtmlElement, video: HtmlVideoElement) -> Self {
        Self { container, video }
    }

    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }
}

impl VideoSurface for DomVideo {
    fn set_source(&self, url: &str) {
        self.video.set_src(url);
    }

    fn clear_source(&self) {
        self.video.set_src("");
    }

    fn play(&self) {
        match self.video.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                // Autoplay policies reject here; the user can still press play
                if let Err(e) = JsFuture::from(promise).await {
                    tracing::debug!(reason = ?e, "play() was rejected");
                }
            }),
            Err(e) => tracing::warn!(error = ?e, "play() threw"),
        }
    }

    fn pause(&self) {
        if let Err(e) = self.video.pause() {
            tracing::warn!(error = ?e, "pause() threw");
        }
    }

    fn set_visible(&self, visible: bool) {
        set_display(&self.container, visible);
    }
}
