//! Keyplay WASM - browser binding
//!
//! Wires the decode and DRM forms of the page to `keyplay-core`:
//! - DOM views resolved once and injected into the flows
//! - `fetch` transport against the page origin
//! - hls.js playback with native fallback
//!
//! ## Usage
//!
//! ```javascript
//! import init, { mount } from './pkg/keyplay_wasm.js';
//!
//! await init();          // wires the page with default element ids
//! mount({ keysEndpoint: '/v2/get-keys' });   // optional: rewire with overrides
//! ```

use keyplay_core::{
    ApiClient, AppConfig, DecodeFlow, DecodeView, KeysFlow, KeysView, PlayerController,
};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, EventTarget, HtmlElement, HtmlFormElement, HtmlInputElement};

mod dom;
mod fetch;
mod hls;
mod logging;

pub use dom::{DomButton, DomInput, DomPanel, DomVideo};
pub use fetch::FetchTransport;
pub use hls::{HlsEngine, HlsSession};

use dom::element;

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    static DEFERRED_MOUNT: RefCell<Option<Listener>> = const { RefCell::new(None) };
}

/// Best-effort message out of a thrown JS value
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// An event listener that unregisters itself when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }

    /// `submit` listener that cancels navigation and runs `handler`
    fn submit(form: &HtmlFormElement, handler: impl Fn() + 'static) -> Result<Self, JsValue> {
        Self::new(form, "submit", move |e: Event| {
            e.prevent_default();
            handler();
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Everything kept alive while the page is wired
struct App {
    _listeners: Vec<Listener>,
}

fn build(document: &Document, config: &AppConfig) -> Result<App, JsValue> {
    let ids = &config.elements;

    let origin = web_sys::window()
        .ok_or_else(|| JsValue::from_str("window is unavailable"))?
        .location()
        .origin()?;
    let base_url = Url::parse(&origin).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let client = Rc::new(ApiClient::new(base_url, config, FetchTransport));

    let surface = DomVideo::new(
        element::<HtmlElement>(document, &ids.video_container)?,
        element(document, &ids.video_player)?,
    );
    let player = Rc::new(PlayerController::new(
        surface,
        HlsEngine,
        config.manifest_marker.clone(),
    ));

    let input = |id: &str| -> Result<Rc<DomInput>, JsValue> {
        Ok(Rc::new(DomInput(element::<HtmlInputElement>(document, id)?)))
    };
    let panel = |root: &str, content: &str| -> Result<Rc<DomPanel>, JsValue> {
        Ok(Rc::new(DomPanel::new(element(document, root)?, element(document, content)?)))
    };

    let decode_form: HtmlFormElement = element(document, &ids.decode_form)?;
    let drm_form: HtmlFormElement = element(document, &ids.drm_form)?;
    let drm_token = input(&ids.drm_token)?;

    let decode = Rc::new(DecodeFlow::new(
        DecodeView {
            button: Rc::new(DomButton::in_form(&decode_form)?),
            token: input(&ids.decode_token)?,
            encrypted_url: input(&ids.encrypted_url)?,
            panel: panel(&ids.decode_response, &ids.decode_response_content)?,
            forward_token: drm_token.clone(),
        },
        client.clone(),
        player,
        &config.processing_label,
    ));

    let keys = Rc::new(KeysFlow::new(
        KeysView {
            button: Rc::new(DomButton::in_form(&drm_form)?),
            token: drm_token,
            video_url: input(&ids.video_url)?,
            panel: panel(&ids.drm_response, &ids.drm_response_content)?,
        },
        client,
        &config.processing_label,
    ));

    let listeners = vec![
        Listener::submit(&decode_form, move || {
            let flow = decode.clone();
            spawn_local(async move {
                flow.submit().await;
            });
        })?,
        Listener::submit(&drm_form, move || {
            let flow = keys.clone();
            spawn_local(async move {
                flow.submit().await;
            });
        })?,
    ];

    Ok(App {
        _listeners: listeners,
    })
}

fn mount_config(config: AppConfig) -> Result<(), JsValue> {
    config
        .validate()
        .map_err(|e| JsValue::from(JsError::new(&e.to_string())))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document is unavailable"))?;

    // Drop the previous wiring first so its listeners are removed
    APP.with(|app| app.borrow_mut().take());
    let app = build(&document, &config)?;
    APP.with(|slot| *slot.borrow_mut() = Some(app));

    tracing::info!(
        decode = %config.decode_endpoint,
        keys = %config.keys_endpoint,
        "Forms wired"
    );
    Ok(())
}

/// Wire the page. `config` is an optional object overriding [`AppConfig`]
/// fields (camelCase); calling again replaces the previous wiring.
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<(), JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        AppConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    DEFERRED_MOUNT.with(|slot| slot.borrow_mut().take());
    mount_config(config)
}

/// Remove all listeners installed by [`mount`]
#[wasm_bindgen]
pub fn unmount() {
    APP.with(|app| app.borrow_mut().take());
    tracing::info!("Forms unwired");
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    keyplay_core::VERSION.to_string()
}

fn auto_mount() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document is unavailable"))?;

    let ready_state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))?
        .as_string()
        .unwrap_or_default();

    if ready_state == "loading" {
        // Stays registered until mount()/page unload; the event fires once
        let listener = Listener::new(&document, "DOMContentLoaded", |_| {
            if let Err(e) = mount_default_if_present() {
                tracing::error!(error = %js_message(&e), "Mount failed");
            }
        })?;
        DEFERRED_MOUNT.with(|slot| *slot.borrow_mut() = Some(listener));
        Ok(())
    } else {
        mount_default_if_present()
    }
}

/// Mount with defaults, but only on pages that carry the decode form
fn mount_default_if_present() -> Result<(), JsValue> {
    let config = AppConfig::default();
    let present = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(&config.elements.decode_form))
        .is_some();

    if present {
        mount_config(config)
    } else {
        tracing::debug!("No decode form on this page; waiting for an explicit mount()");
        Ok(())
    }
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init();
    tracing::info!(version = keyplay_core::VERSION, "Keyplay WASM initialized");

    if let Err(e) = auto_mount() {
        tracing::error!(error = %js_message(&e), "Mount failed");
    }
}
