//! hls.js bindings
//!
//! hls.js is expected as a global `Hls` (script tag). When it is missing the
//! engine simply reports itself unsupported and playback goes native.

use js_sys::Function;
use keyplay_core::{Error, ManifestReady, Result, StreamingEngine, StreamingSession};
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

use crate::{dom::DomVideo, js_message};

/// `Hls.Events.MANIFEST_PARSED`
const MANIFEST_PARSED: &str = "hlsManifestParsed";

#[wasm_bindgen]
extern "C" {
    /// hls.js player instance
    #[wasm_bindgen(js_name = Hls)]
    type Hls;

    #[wasm_bindgen(constructor, catch)]
    fn new() -> std::result::Result<Hls, JsValue>;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported)]
    fn is_supported() -> bool;

    #[wasm_bindgen(method, js_name = loadSource)]
    fn load_source(this: &Hls, url: &str);

    #[wasm_bindgen(method, js_name = attachMedia)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement);

    #[wasm_bindgen(method)]
    fn on(this: &Hls, event: &str, callback: &Function);

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);
}

fn hls_loaded() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("Hls")).unwrap_or(false)
}

/// Engine backed by the global hls.js
#[derive(Debug, Default, Clone, Copy)]
pub struct HlsEngine;

/// One hls.js instance plus its manifest listener
pub struct HlsSession {
    hls: Hls,
    _on_parsed: Closure<dyn FnMut()>,
}

impl StreamingSession for HlsSession {
    fn destroy(self) {
        self.hls.destroy();
    }
}

impl StreamingEngine<DomVideo> for HlsEngine {
    type Session = HlsSession;

    fn is_supported(&self) -> bool {
        hls_loaded() && Hls::is_supported()
    }

    fn load(&self, url: &str, surface: &DomVideo, on_ready: ManifestReady) -> Result<HlsSession> {
        let hls = Hls::new().map_err(|e| Error::Player(js_message(&e)))?;
        let on_parsed = Closure::once(move || on_ready());

        hls.load_source(url);
        hls.attach_media(surface.video());
        hls.on(MANIFEST_PARSED, on_parsed.as_ref().unchecked_ref());

        Ok(HlsSession {
            hls,
            _on_parsed: on_parsed,
        })
    }
}
