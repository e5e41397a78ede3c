//! Player control
//!
//! Chooses between adaptive streaming and native playback for a URL and owns
//! the streaming session, if one is active. At most one session is alive at a
//! time: it is destroyed before a new one is created and whenever the player
//! is stopped.

use std::cell::RefCell;
use tracing::{debug, info, warn};

use crate::{types::PlaybackRoute, Result};

/// Media element plus the container that wraps it
pub trait VideoSurface: Clone + 'static {
    fn set_source(&self, url: &str);
    fn clear_source(&self);
    fn play(&self);
    fn pause(&self);
    fn set_visible(&self, visible: bool);
}

/// Callback fired once the engine has parsed the manifest
pub type ManifestReady = Box<dyn FnOnce()>;

/// Adaptive-streaming engine (hls.js in the browser)
pub trait StreamingEngine<V: VideoSurface> {
    type Session: StreamingSession;

    /// Whether the runtime can play through the engine at all
    fn is_supported(&self) -> bool;

    /// Load `url`, attach it to `surface` and call `on_ready` after the
    /// manifest is parsed.
    fn load(&self, url: &str, surface: &V, on_ready: ManifestReady) -> Result<Self::Session>;
}

/// A live engine instance
pub trait StreamingSession {
    /// Detach from the media element and release the instance
    fn destroy(self);
}

/// Object-safe playback interface consumed by the flow handlers
pub trait Playback {
    fn start(&self, url: &str) -> PlaybackRoute;
    fn stop(&self);
}

/// Whether `url` should go through the streaming engine
pub fn choose_route(url: &str, engine_supported: bool, manifest_marker: &str) -> PlaybackRoute {
    if engine_supported && url.contains(manifest_marker) {
        PlaybackRoute::Streaming
    } else {
        PlaybackRoute::Native
    }
}

/// Owns the surface, the engine and at most one streaming session
pub struct PlayerController<V: VideoSurface, E: StreamingEngine<V>> {
    surface: V,
    engine: E,
    manifest_marker: String,
    active: RefCell<Option<E::Session>>,
}

impl<V: VideoSurface, E: StreamingEngine<V>> PlayerController<V, E> {
    pub fn new(surface: V, engine: E, manifest_marker: impl Into<String>) -> Self {
        Self {
            surface,
            engine,
            manifest_marker: manifest_marker.into(),
            active: RefCell::new(None),
        }
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    /// True while a streaming session is owned
    pub fn has_session(&self) -> bool {
        self.active.borrow().is_some()
    }

    fn release_session(&self) {
        let previous = self.active.borrow_mut().take();
        if let Some(session) = previous {
            debug!("Destroying previous streaming session");
            session.destroy();
        }
    }

    fn play_native(&self, url: &str) {
        self.surface.set_source(url);
        self.surface.play();
        self.surface.set_visible(true);
    }
}

impl<V: VideoSurface, E: StreamingEngine<V>> Playback for PlayerController<V, E> {
    fn start(&self, url: &str) -> PlaybackRoute {
        self.release_session();

        let route = choose_route(url, self.engine.is_supported(), &self.manifest_marker);
        info!(url = %url, route = %route, "Starting playback");

        if route == PlaybackRoute::Native {
            self.play_native(url);
            return route;
        }

        let surface = self.surface.clone();
        let on_ready: ManifestReady = Box::new(move || {
            surface.play();
            surface.set_visible(true);
        });

        match self.engine.load(url, &self.surface, on_ready) {
            Ok(session) => {
                *self.active.borrow_mut() = Some(session);
                PlaybackRoute::Streaming
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Streaming engine failed, falling back to native playback");
                self.play_native(url);
                PlaybackRoute::Native
            }
        }
    }

    fn stop(&self) {
        self.release_session();
        self.surface.set_visible(false);
        self.surface.pause();
        self.surface.clear_source();
    }
}
