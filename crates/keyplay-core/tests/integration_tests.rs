//! Integration tests for Keyplay Core

use async_trait::async_trait;
use keyplay_core::{
    AppConfig, ApiClient, DecodeFlow, DecodeView, Error, HttpRequest, HttpResponse, KeysFlow,
    KeysView, ManifestReady, Playback, PlaybackRoute, PlayerController, ResponsePanel, Result,
    StreamingEngine, StreamingSession, SubmitButton, SubmitStatus, TextInput, Transport,
    VideoSurface, PROCESSING_LABEL,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use url::Url;

// =============================================================================
// Fakes
// =============================================================================

type Slot = Rc<RefCell<Option<Result<HttpResponse>>>>;

/// Resolves once its slot is filled
struct Pending(Slot);

impl Future for Pending {
    type Output = Result<HttpResponse>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.0.borrow_mut().take() {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}

#[derive(Clone, Default)]
struct Scripted {
    slots: Rc<RefCell<VecDeque<Slot>>>,
    sent: Rc<RefCell<Vec<HttpRequest>>>,
}

impl Scripted {
    fn reply(&self, status: u16, body: &str) {
        self.slots.borrow_mut().push_back(Rc::new(RefCell::new(Some(Ok(HttpResponse {
            status,
            body: body.to_string(),
        })))));
    }

    fn fail(&self, message: &str) {
        self.slots
            .borrow_mut()
            .push_back(Rc::new(RefCell::new(Some(Err(Error::transport(message))))));
    }

    /// Queue a reply that stays pending until the returned slot is filled
    fn deferred(&self) -> Slot {
        let slot: Slot = Rc::new(RefCell::new(None));
        self.slots.borrow_mut().push_back(slot.clone());
        slot
    }
}

#[async_trait(?Send)]
impl Transport for Scripted {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.sent.borrow_mut().push(request);
        let slot = self
            .slots
            .borrow_mut()
            .pop_front()
            .expect("unexpected request");
        Pending(slot).await
    }
}

#[derive(Default)]
struct Input(RefCell<String>);

impl Input {
    fn with(value: &str) -> Rc<Self> {
        Rc::new(Self(RefCell::new(value.to_string())))
    }
}

impl TextInput for Input {
    fn value(&self) -> String {
        self.0.borrow().clone()
    }
    fn set_value(&self, value: &str) {
        *self.0.borrow_mut() = value.to_string();
    }
}

#[derive(Default)]
struct Button {
    disabled: Cell<bool>,
    label: RefCell<String>,
    stash: RefCell<Option<String>>,
}

impl Button {
    fn labelled(label: &str) -> Rc<Self> {
        let button = Self::default();
        *button.label.borrow_mut() = label.to_string();
        Rc::new(button)
    }
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

#[derive(Default)]
struct Panel {
    text: RefCell<String>,
    class: RefCell<String>,
    visible: Cell<bool>,
}

impl ResponsePanel for Panel {
    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }
    fn set_class(&self, class: &str) {
        *self.class.borrow_mut() = class.to_string();
    }
    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

#[derive(Default, Debug)]
struct SurfaceState {
    src: String,
    playing: bool,
    visible: bool,
}

#[derive(Clone, Default)]
struct Surface(Rc<RefCell<SurfaceState>>);

impl VideoSurface for Surface {
    fn set_source(&self, url: &str) {
        self.0.borrow_mut().src = url.to_string();
    }
    fn clear_source(&self) {
        self.0.borrow_mut().src.clear();
    }
    fn play(&self) {
        self.0.borrow_mut().playing = true;
    }
    fn pause(&self) {
        self.0.borrow_mut().playing = false;
    }
    fn set_visible(&self, visible: bool) {
        self.0.borrow_mut().visible = visible;
    }
}

#[derive(Clone, Default)]
struct Engine {
    unsupported: bool,
    broken: bool,
    loaded: Rc<RefCell<Vec<String>>>,
    destroyed: Rc<Cell<u32>>,
    ready: Rc<RefCell<Option<ManifestReady>>>,
}

impl Engine {
    fn fire_manifest_parsed(&self) {
        let ready = self.ready.borrow_mut().take().expect("no manifest pending");
        ready();
    }
}

struct Session(Rc<Cell<u32>>);

impl StreamingSession for Session {
    fn destroy(self) {
        self.0.set(self.0.get() + 1);
    }
}

impl StreamingEngine<Surface> for Engine {
    type Session = Session;

    fn is_supported(&self) -> bool {
        !self.unsupported
    }

    fn load(&self, url: &str, _surface: &Surface, on_ready: ManifestReady) -> Result<Session> {
        if self.broken {
            return Err(Error::Player("constructor threw".into()));
        }
        self.loaded.borrow_mut().push(url.to_string());
        *self.ready.borrow_mut() = Some(on_ready);
        Ok(Session(self.destroyed.clone()))
    }
}

struct Harness {
    transport: Scripted,
    engine: Engine,
    surface: Surface,
    player: Rc<PlayerController<Surface, Engine>>,
    decode_button: Rc<Button>,
    decode_panel: Rc<Panel>,
    drm_token: Rc<Input>,
    keys_button: Rc<Button>,
    keys_panel: Rc<Panel>,
    decode: DecodeFlow,
    keys: KeysFlow,
}

fn harness_with(engine: Engine) -> Harness {
    let config = AppConfig::default();
    let transport = Scripted::default();
    let client = Rc::new(ApiClient::new(
        Url::parse("http://localhost:5000").unwrap(),
        &config,
        transport.clone(),
    ));

    let surface = Surface::default();
    let player = Rc::new(PlayerController::new(
        surface.clone(),
        engine.clone(),
        config.manifest_marker.clone(),
    ));

    let decode_button = Button::labelled("Decode & Play");
    let decode_panel = Rc::new(Panel::default());
    let drm_token = Input::with("old-token");
    let keys_button = Button::labelled("Get Keys");
    let keys_panel = Rc::new(Panel::default());

    let decode = DecodeFlow::new(
        DecodeView {
            button: decode_button.clone(),
            token: Input::with("tok"),
            encrypted_url: Input::with("enc"),
            panel: decode_panel.clone(),
            forward_token: drm_token.clone(),
        },
        client.clone(),
        player.clone(),
        &config.processing_label,
    );
    let keys = KeysFlow::new(
        KeysView {
            button: keys_button.clone(),
            token: drm_token.clone(),
            video_url: Input::with("https://cdn/video.mpd"),
            panel: keys_panel.clone(),
        },
        client,
        &config.processing_label,
    );

    Harness {
        transport,
        engine,
        surface,
        player,
        decode_button,
        decode_panel,
        drm_token,
        keys_button,
        keys_panel,
        decode,
        keys,
    }
}

fn harness() -> Harness {
    harness_with(Engine::default())
}

const SUCCESS: &str = "mt-4 p-3 rounded bg-success-subtle text-success-emphasis";
const FAILURE: &str = "mt-4 p-3 rounded bg-danger-subtle text-danger-emphasis";

// =============================================================================
// Decode Flow Tests
// =============================================================================

#[test]
fn test_decode_manifest_takes_streaming_path() {
    let h = harness();
    h.transport
        .reply(200, r#"{"success":true,"url":"https://x/master.m3u8"}"#);

    let status = tokio_test::block_on(h.decode.submit());

    assert_eq!(status, SubmitStatus::Succeeded);
    assert_eq!(*h.engine.loaded.borrow(), vec!["https://x/master.m3u8".to_string()]);
    assert!(!h.surface.0.borrow().visible);

    h.engine.fire_manifest_parsed();
    let surface = h.surface.0.borrow();
    assert!(surface.visible);
    assert!(surface.playing);
    assert!(surface.src.is_empty());
}

#[test]
fn test_decode_plain_file_takes_native_path() {
    let h = harness();
    h.transport.reply(200, r#"{"success":true,"url":"https://x/file.mp4"}"#);

    tokio_test::block_on(h.decode.submit());

    assert!(h.engine.loaded.borrow().is_empty());
    let surface = h.surface.0.borrow();
    assert_eq!(surface.src, "https://x/file.mp4");
    assert!(surface.visible);
    assert!(surface.playing);
}

#[test]
fn test_decode_without_engine_support_plays_natively() {
    let h = harness_with(Engine { unsupported: true, ..Engine::default() });
    h.transport
        .reply(200, r#"{"success":true,"url":"https://x/master.m3u8"}"#);

    tokio_test::block_on(h.decode.submit());

    assert!(h.engine.loaded.borrow().is_empty());
    assert_eq!(h.surface.0.borrow().src, "https://x/master.m3u8");
}

#[test]
fn test_engine_failure_falls_back_to_native() {
    let h = harness_with(Engine { broken: true, ..Engine::default() });
    assert_eq!(h.player.start("https://x/master.m3u8"), PlaybackRoute::Native);
    assert_eq!(h.surface.0.borrow().src, "https://x/master.m3u8");
    assert!(!h.player.has_session());
}

#[test]
fn test_decode_renders_full_reply() {
    let h = harness();
    let body = r#"{"status":"ok","success":true,"url":"https://x/file.mp4"}"#;
    h.transport.reply(200, body);

    tokio_test::block_on(h.decode.submit());

    let expected: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        *h.decode_panel.text.borrow(),
        serde_json::to_string_pretty(&expected).unwrap()
    );
    assert_eq!(*h.decode_panel.class.borrow(), SUCCESS);
    assert!(h.decode_panel.visible.get());
}

#[test]
fn test_decode_forwards_refreshed_token() {
    let h = harness();
    h.transport.reply(
        200,
        r#"{"success":true,"url":"https://x/file.mp4","new_token_info":{"token":"fresh","generated_by":"a@b.c"}}"#,
    );

    tokio_test::block_on(h.decode.submit());
    assert_eq!(h.drm_token.value(), "fresh");
}

#[test]
fn test_decode_without_new_token_leaves_field() {
    let h = harness();
    h.transport.reply(200, r#"{"success":true,"url":"https://x/file.mp4"}"#);

    tokio_test::block_on(h.decode.submit());
    assert_eq!(h.drm_token.value(), "old-token");
}

#[test]
fn test_decode_logical_failure_is_styled_as_failure() {
    let h = harness();
    h.transport.reply(200, r#"{"success":false,"message":"nope"}"#);

    let status = tokio_test::block_on(h.decode.submit());

    assert_eq!(status, SubmitStatus::Failed);
    assert_eq!(*h.decode_panel.class.borrow(), FAILURE);
    assert!(h.decode_panel.text.borrow().contains("\"message\": \"nope\""));
    assert!(h.engine.loaded.borrow().is_empty());
}

#[test]
fn test_decode_http_error_shows_details() {
    let h = harness();
    h.transport.reply(500, r#"{"details":"bad token"}"#);

    let status = tokio_test::block_on(h.decode.submit());

    assert_eq!(status, SubmitStatus::Failed);
    assert_eq!(*h.decode_panel.text.borrow(), "{\n  \"error\": \"bad token\"\n}");
    assert_eq!(*h.decode_panel.class.borrow(), FAILURE);
}

#[test]
fn test_decode_transport_error_shows_message() {
    let h = harness();
    h.transport.fail("Failed to fetch");

    tokio_test::block_on(h.decode.submit());
    assert_eq!(*h.decode_panel.text.borrow(), "{\n  \"error\": \"Failed to fetch\"\n}");
}

#[test]
fn test_decode_sends_form_fields() {
    let h = harness();
    h.transport.reply(200, r#"{"success":false}"#);

    tokio_test::block_on(h.decode.submit());

    let sent = h.transport.sent.borrow();
    assert_eq!(sent[0].url.path(), "/api/decode");
    let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body, serde_json::json!({ "token": "tok", "encrypted_url": "enc" }));
}

#[test]
fn test_decode_stops_player_before_request() {
    let h = harness();
    h.player.start("https://x/old.mp4");
    let slot = h.transport.deferred();

    let mut task = tokio_test::task::spawn(h.decode.submit());
    assert!(task.poll().is_pending());

    {
        let surface = h.surface.0.borrow();
        assert!(!surface.visible);
        assert!(!surface.playing);
        assert!(surface.src.is_empty());
    }
    assert_eq!(h.decode_button.label(), PROCESSING_LABEL);
    assert!(h.decode_button.disabled.get());
    assert!(!h.decode_panel.visible.get());

    *slot.borrow_mut() = Some(Ok(HttpResponse { status: 200, body: r#"{"success":false}"#.into() }));
    assert!(task.poll().is_ready());
    assert_eq!(h.decode_button.label(), "Decode & Play");
    assert!(!h.decode_button.disabled.get());
}

#[test]
fn test_new_decode_destroys_previous_session() {
    let h = harness();
    h.transport.reply(200, r#"{"success":true,"url":"https://x/a.m3u8"}"#);
    h.transport.reply(200, r#"{"success":true,"url":"https://x/b.m3u8"}"#);

    tokio_test::block_on(h.decode.submit());
    assert!(h.player.has_session());
    assert_eq!(h.engine.destroyed.get(), 0);

    tokio_test::block_on(h.decode.submit());
    assert_eq!(h.engine.destroyed.get(), 1);
    assert!(h.player.has_session());
    assert_eq!(h.engine.loaded.borrow().len(), 2);

    h.player.stop();
    assert_eq!(h.engine.destroyed.get(), 2);
    assert!(!h.player.has_session());
}

#[test]
fn test_superseded_decode_renders_nothing() {
    let h = harness();
    let first = h.transport.deferred();
    let second = h.transport.deferred();

    let mut older = tokio_test::task::spawn(h.decode.submit());
    assert!(older.poll().is_pending());
    let mut newer = tokio_test::task::spawn(h.decode.submit());
    assert!(newer.poll().is_pending());

    *second.borrow_mut() = Some(Ok(HttpResponse {
        status: 200,
        body: r#"{"success":true,"url":"https://x/new.mp4"}"#.into(),
    }));
    assert!(newer.poll().is_ready());
    assert_eq!(h.surface.0.borrow().src, "https://x/new.mp4");
    assert_eq!(h.decode_button.label(), "Decode & Play");

    *first.borrow_mut() = Some(Ok(HttpResponse {
        status: 200,
        body: r#"{"success":true,"url":"https://x/old.mp4"}"#.into(),
    }));
    match older.poll() {
        std::task::Poll::Ready(status) => assert_eq!(status, SubmitStatus::Superseded),
        std::task::Poll::Pending => panic!("older submit should have finished"),
    }
    assert_eq!(h.surface.0.borrow().src, "https://x/new.mp4");
    assert!(h.decode_panel.text.borrow().contains("new.mp4"));
}

// =============================================================================
// Key Retrieval Flow Tests
// =============================================================================

#[test]
fn test_keys_success_text() {
    let h = harness();
    h.transport
        .reply(200, r#"{"success":true,"data":["K1","K2"],"mpd_url":"http://m"}"#);

    let status = tokio_test::block_on(h.keys.submit());

    assert_eq!(status, SubmitStatus::Succeeded);
    assert_eq!(*h.keys_panel.text.borrow(), "MPD URL:\nhttp://m\n\nKEYS:\nK1\nK2");
    assert_eq!(*h.keys_panel.class.borrow(), SUCCESS);
    assert!(h.keys_panel.visible.get());
}

#[test]
fn test_keys_uses_forwarded_token() {
    let h = harness();
    h.transport.reply(
        200,
        r#"{"success":true,"url":"https://x/file.mp4","new_token_info":{"token":"fresh"}}"#,
    );
    h.transport.reply(200, r#"{"success":true,"data":["K"],"mpd_url":"m"}"#);

    tokio_test::block_on(h.decode.submit());
    tokio_test::block_on(h.keys.submit());

    let sent = h.transport.sent.borrow();
    assert_eq!(sent[1].url.path(), "/api/get-keys");
    let body: serde_json::Value = serde_json::from_str(sent[1].body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "token": "fresh", "video_url": "https://cdn/video.mpd" })
    );
}

#[test]
fn test_keys_rejection_renders_raw_reply() {
    let h = harness();
    h.transport
        .reply(200, r#"{"success":false,"error":"No keys found"}"#);

    let status = tokio_test::block_on(h.keys.submit());

    assert_eq!(status, SubmitStatus::Failed);
    assert_eq!(
        *h.keys_panel.text.borrow(),
        "{\n  \"success\": false,\n  \"error\": \"No keys found\"\n}"
    );
    assert_eq!(*h.keys_panel.class.borrow(), FAILURE);
}

#[test]
fn test_keys_unauthorized_uses_error_field() {
    let h = harness();
    h.transport.reply(
        401,
        r#"{"success":false,"error":"Token is invalid or expired. Please use the decoder to get a new one."}"#,
    );

    tokio_test::block_on(h.keys.submit());

    assert!(h
        .keys_panel
        .text
        .borrow()
        .contains("Token is invalid or expired"));
    assert_eq!(h.keys_button.label(), "Get Keys");
    assert!(!h.keys_button.disabled.get());
}

#[test]
fn test_keys_flow_leaves_player_alone() {
    let h = harness();
    h.player.start("https://x/file.mp4");
    h.transport.reply(200, r#"{"success":true,"data":[],"mpd_url":""}"#);

    tokio_test::block_on(h.keys.submit());
    assert!(h.surface.0.borrow().playing);
}
