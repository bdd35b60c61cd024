//! Controller behaviour against scripted host engines.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, TlsTrustPolicy};
use bridge_traits::playback::{
    AssetProbe, AssetProber, BufferedEngine, BufferedPlayer, ItemStatus, StreamingEngine,
    StreamingPlayer,
};
use bridge_desktop::HttpAssetProber;
use bytes::Bytes;
use core_async::sync::Notify;
use core_async::time::sleep;
use core_playback::{
    PlaybackConfig, PlaybackController, PlaybackError, PlaybackMode, ProgressObserver,
    StreamingSeekMode,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream, PlayerEvent};
use parking_lot::Mutex;

const URL: &str = "https://media.example.com/episodes/42.mp3";

// ---------------------------------------------------------------------------
// Host fakes
// ---------------------------------------------------------------------------

struct FixedProber(Option<AssetProbe>);

#[async_trait]
impl AssetProber for FixedProber {
    async fn probe(&self, _url: &str) -> BridgeResult<AssetProbe> {
        self.0
            .ok_or_else(|| BridgeError::OperationFailed("probe timed out".to_string()))
    }
}

mockall::mock! {
    Prober {}

    #[async_trait]
    impl AssetProber for Prober {
        async fn probe(&self, url: &str) -> BridgeResult<AssetProbe>;
    }
}

struct StaticHttp {
    status: u16,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StaticHttp {
    fn new(status: u16) -> Self {
        Self {
            status,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HttpClient for StaticHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requests.lock().push(request);
        Ok(HttpResponse {
            status: self.status,
            headers: HashMap::new(),
            body: Bytes::from_static(b"ID3\x04fake-mp3"),
        })
    }
}

#[derive(Default)]
struct FakeStreamingPlayer {
    playing: Mutex<bool>,
    plays: Mutex<u32>,
    status: Mutex<ItemStatus>,
    position: Mutex<Duration>,
    duration: Mutex<Option<Duration>>,
    seeks: Mutex<Vec<Duration>>,
}

impl FakeStreamingPlayer {
    fn ready(duration: Duration) -> Arc<Self> {
        let player = Self::default();
        *player.status.lock() = ItemStatus::ReadyToPlay;
        *player.duration.lock() = Some(duration);
        Arc::new(player)
    }
}

impl StreamingPlayer for FakeStreamingPlayer {
    fn play(&self) {
        *self.plays.lock() += 1;
        *self.playing.lock() = true;
    }

    fn seek(&self, position: Duration) {
        self.seeks.lock().push(position);
        *self.position.lock() = position;
    }

    fn current_time(&self) -> Duration {
        *self.position.lock()
    }

    fn duration(&self) -> Option<Duration> {
        *self.duration.lock()
    }

    fn item_status(&self) -> ItemStatus {
        *self.status.lock()
    }

    /// Like a native engine, an item only advances once it is ready.
    fn is_playing(&self) -> bool {
        *self.playing.lock() && *self.status.lock() == ItemStatus::ReadyToPlay
    }
}

struct FakeStreamingEngine {
    player: Arc<FakeStreamingPlayer>,
    refuse: bool,
    opened: Mutex<Vec<String>>,
}

impl StreamingEngine for FakeStreamingEngine {
    fn open(&self, url: &str) -> BridgeResult<Arc<dyn StreamingPlayer>> {
        self.opened.lock().push(url.to_string());
        if self.refuse {
            return Err(BridgeError::NotAvailable("no streaming output".to_string()));
        }
        Ok(self.player.clone())
    }
}

struct FakeBufferedPlayer {
    playing: Mutex<bool>,
    plays: Mutex<u32>,
    refuse: bool,
    position: Mutex<Duration>,
    duration: Duration,
    volume: Mutex<Option<f32>>,
    seeks: Mutex<Vec<Duration>>,
}

impl FakeBufferedPlayer {
    fn new(duration: Duration) -> Arc<Self> {
        Self::build(duration, false)
    }

    fn refusing(duration: Duration) -> Arc<Self> {
        Self::build(duration, true)
    }

    fn build(duration: Duration, refuse: bool) -> Arc<Self> {
        Arc::new(Self {
            playing: Mutex::new(false),
            plays: Mutex::new(0),
            refuse,
            position: Mutex::new(Duration::ZERO),
            duration,
            volume: Mutex::new(None),
            seeks: Mutex::new(Vec::new()),
        })
    }

    fn plays(&self) -> u32 {
        *self.plays.lock()
    }

    fn stop(&self) {
        *self.playing.lock() = false;
    }
}

impl BufferedPlayer for FakeBufferedPlayer {
    fn play(&self) -> bool {
        *self.plays.lock() += 1;
        if self.refuse {
            return false;
        }
        *self.playing.lock() = true;
        true
    }

    fn set_current_time(&self, position: Duration) {
        self.seeks.lock().push(position);
        *self.position.lock() = position;
    }

    fn current_time(&self) -> Duration {
        *self.position.lock()
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock() = Some(volume);
    }

    fn is_playing(&self) -> bool {
        *self.playing.lock()
    }
}

struct FakeBufferedEngine {
    player: Arc<FakeBufferedPlayer>,
    gate: Option<Arc<Notify>>,
    reject: bool,
    decoded: Mutex<Vec<Bytes>>,
}

#[async_trait]
impl BufferedEngine for FakeBufferedEngine {
    async fn decode(&self, payload: Bytes) -> BridgeResult<Arc<dyn BufferedPlayer>> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.decoded.lock().push(payload);
        if self.reject {
            return Err(BridgeError::OperationFailed(
                "unrecognized audio format".to_string(),
            ));
        }
        Ok(self.player.clone())
    }
}

#[derive(Default)]
struct RecordingObserver {
    updates: Mutex<Vec<(f64, String)>>,
}

impl RecordingObserver {
    fn count(&self) -> usize {
        self.updates.lock().len()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, current_seconds: f64, total_formatted: &str) {
        self.updates
            .lock()
            .push((current_seconds, total_formatted.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Host {
    probe: Option<AssetProbe>,
    http_status: u16,
    streaming_refuses: bool,
    decode_rejects: bool,
    gate: Option<Arc<Notify>>,
    streaming_player: Arc<FakeStreamingPlayer>,
    buffered_player: Arc<FakeBufferedPlayer>,
    event_bus: Option<EventBus>,
}

struct Wired {
    core: CoreConfig,
    http: Arc<StaticHttp>,
    streaming: Arc<FakeStreamingEngine>,
    buffered: Arc<FakeBufferedEngine>,
}

impl Host {
    fn streaming() -> Self {
        Self {
            probe: Some(AssetProbe::new(true, true)),
            ..Self::buffered()
        }
    }

    fn buffered() -> Self {
        Self {
            probe: Some(AssetProbe::new(true, false)),
            http_status: 200,
            streaming_refuses: false,
            decode_rejects: false,
            gate: None,
            streaming_player: FakeStreamingPlayer::ready(Duration::from_secs(120)),
            buffered_player: FakeBufferedPlayer::new(Duration::from_secs(200)),
            event_bus: None,
        }
    }

    fn gated(mut self, gate: &Arc<Notify>) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    fn wire(self) -> Wired {
        let http = Arc::new(StaticHttp::new(self.http_status));
        let streaming = Arc::new(FakeStreamingEngine {
            player: self.streaming_player,
            refuse: self.streaming_refuses,
            opened: Mutex::new(Vec::new()),
        });
        let buffered = Arc::new(FakeBufferedEngine {
            player: self.buffered_player,
            gate: self.gate,
            reject: self.decode_rejects,
            decoded: Mutex::new(Vec::new()),
        });

        let mut builder = CoreConfig::builder()
            .http_client(http.clone())
            .asset_prober(Arc::new(FixedProber(self.probe)))
            .streaming_engine(streaming.clone())
            .buffered_engine(buffered.clone());
        if let Some(bus) = self.event_bus {
            builder = builder.event_bus(bus);
        }

        Wired {
            core: builder.build().unwrap(),
            http,
            streaming,
            buffered,
        }
    }
}

impl Wired {
    fn controller(&self) -> PlaybackController {
        self.controller_with(PlaybackConfig::default())
    }

    fn controller_with(&self, config: PlaybackConfig) -> PlaybackController {
        PlaybackController::new(URL, &self.core, config).unwrap()
    }
}

// ---------------------------------------------------------------------------
// Mode detection
// ---------------------------------------------------------------------------

#[core_async::test]
async fn streamable_source_uses_streaming_engine() {
    let wired = Host::streaming().wire();
    let controller = wired.controller();

    assert_eq!(controller.wait_for_mode().await, PlaybackMode::Streaming);
    assert_eq!(controller.mode(), Some(PlaybackMode::Streaming));
    assert!(controller.is_ready());
    assert_eq!(controller.duration(), 120.0);
    assert_eq!(*wired.streaming.opened.lock(), vec![URL.to_string()]);
    assert!(wired.http.requests.lock().is_empty(), "streaming must not download");
}

#[core_async::test]
async fn negative_probe_downloads_and_decodes() {
    let wired = Host::buffered().wire();
    let controller = wired.controller();

    assert_eq!(controller.wait_for_mode().await, PlaybackMode::Buffered);
    assert!(controller.wait_until_settled().await);
    assert!(controller.is_ready());
    assert_eq!(controller.duration(), 200.0);
    assert!(wired.streaming.opened.lock().is_empty());
    assert_eq!(&wired.buffered.decoded.lock()[0][..], b"ID3\x04fake-mp3");
}

#[core_async::test]
async fn probe_error_falls_back_to_buffered() {
    let wired = Host {
        probe: None,
        ..Host::buffered()
    }
    .wire();
    let controller = wired.controller();

    assert_eq!(controller.wait_for_mode().await, PlaybackMode::Buffered);
    assert!(controller.wait_until_settled().await);
}

struct UnreachableHttp;

#[async_trait]
impl HttpClient for UnreachableHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        Err(BridgeError::OperationFailed(format!(
            "relative URL without a base: {}",
            request.url
        )))
    }
}

#[core_async::test]
async fn malformed_source_resolves_to_buffered_and_fails() {
    let wired = Host::buffered().wire();
    let http: Arc<dyn HttpClient> = Arc::new(UnreachableHttp);
    let core = CoreConfig::builder()
        .http_client(http.clone())
        .asset_prober(Arc::new(HttpAssetProber::new(http)))
        .streaming_engine(wired.streaming.clone())
        .buffered_engine(wired.buffered.clone())
        .build()
        .unwrap();

    let controller =
        PlaybackController::new("not a url", &core, PlaybackConfig::default()).unwrap();
    controller.play();

    assert_eq!(controller.wait_for_mode().await, PlaybackMode::Buffered);
    assert!(!controller.wait_until_settled().await);
    assert!(!controller.is_ready());
    assert!(controller.last_error().is_some());
    assert!(wired.streaming.opened.lock().is_empty());
    assert!(wired.buffered.decoded.lock().is_empty());
}

#[core_async::test]
async fn streaming_engine_refusal_falls_back_to_buffered() {
    let wired = Host {
        streaming_refuses: true,
        ..Host::streaming()
    }
    .wire();
    let controller = wired.controller();

    assert_eq!(controller.wait_for_mode().await, PlaybackMode::Buffered);
    assert!(controller.wait_until_settled().await);
    assert_eq!(wired.streaming.opened.lock().len(), 1);
}

#[core_async::test]
async fn prober_sees_the_source_url_once() {
    let mut prober = MockProber::new();
    prober
        .expect_probe()
        .withf(|url| url.to_string() == URL)
        .times(1)
        .returning(|_| Ok(AssetProbe::new(true, true)));

    let wired = Host::streaming().wire();
    let core = CoreConfig::builder()
        .http_client(wired.http.clone())
        .asset_prober(Arc::new(prober))
        .streaming_engine(wired.streaming.clone())
        .buffered_engine(wired.buffered.clone())
        .build()
        .unwrap();

    let controller = PlaybackController::new(URL, &core, PlaybackConfig::default()).unwrap();
    assert_eq!(controller.wait_for_mode().await, PlaybackMode::Streaming);
}

#[core_async::test]
async fn mode_is_stable_after_resolution() {
    let wired = Host::buffered().wire();
    let controller = wired.controller();

    assert_eq!(controller.wait_for_mode().await, PlaybackMode::Buffered);
    controller.wait_until_settled().await;
    controller.play();
    controller.seek(0.5);
    assert_eq!(controller.mode(), Some(PlaybackMode::Buffered));
    assert_eq!(controller.wait_for_mode().await, PlaybackMode::Buffered);
}

// ---------------------------------------------------------------------------
// Pending play
// ---------------------------------------------------------------------------

#[core_async::test]
async fn play_while_loading_fires_once_when_ready() {
    let gate = Arc::new(Notify::new());
    let host = Host::buffered().gated(&gate);
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();

    controller.wait_for_mode().await;
    assert!(!controller.is_ready());

    controller.play();
    assert!(controller.has_pending_play());
    assert_eq!(player.plays(), 0);

    gate.notify_one();
    assert!(controller.wait_until_settled().await);

    assert_eq!(player.plays(), 1);
    assert!(!controller.has_pending_play());
}

#[core_async::test]
async fn repeated_play_while_loading_is_coalesced() {
    let gate = Arc::new(Notify::new());
    let host = Host::buffered().gated(&gate);
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();

    controller.wait_for_mode().await;
    controller.play();
    controller.play();
    controller.play();

    gate.notify_one();
    controller.wait_until_settled().await;
    assert_eq!(player.plays(), 1);
}

#[core_async::test]
async fn no_play_without_request() {
    let host = Host::buffered();
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();

    assert!(controller.wait_until_settled().await);
    assert_eq!(player.plays(), 0);
    assert!(!controller.has_pending_play());
}

#[core_async::test]
async fn play_after_ready_starts_immediately() {
    let host = Host::buffered();
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();

    controller.wait_until_settled().await;
    controller.play();
    assert_eq!(player.plays(), 1);
    assert!(player.is_playing());
}

#[core_async::test]
async fn volume_is_applied_before_playback() {
    let host = Host::buffered();
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller_with(PlaybackConfig::default().with_buffered_volume(0.4));

    controller.wait_until_settled().await;
    assert_eq!(*player.volume.lock(), Some(0.4));
}

// ---------------------------------------------------------------------------
// Seek and position
// ---------------------------------------------------------------------------

#[core_async::test]
async fn seek_while_loading_is_dropped() {
    let gate = Arc::new(Notify::new());
    let host = Host::buffered().gated(&gate);
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();

    controller.wait_for_mode().await;
    controller.seek(0.5);
    assert_eq!(controller.current_time(), 0.0);
    assert_eq!(controller.duration(), 0.0);

    gate.notify_one();
    controller.wait_until_settled().await;
    assert!(player.seeks.lock().is_empty());
    assert_eq!(controller.current_time(), 0.0);
}

#[core_async::test]
async fn buffered_seek_is_fraction_of_duration() {
    let host = Host::buffered();
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();
    controller.wait_until_settled().await;

    controller.seek(0.5);
    assert_eq!(controller.current_time(), 100.0);

    controller.seek(0.25);
    assert_eq!(controller.current_time(), 50.0);

    controller.seek(1.5);
    assert_eq!(controller.current_time(), 200.0);

    controller.seek(f64::NAN);
    assert_eq!(player.seeks.lock().len(), 3);
}

#[core_async::test]
async fn streaming_seek_is_fraction_of_duration() {
    let host = Host::streaming();
    let player = host.streaming_player.clone();
    let wired = host.wire();
    let controller = wired.controller();
    controller.wait_for_mode().await;

    controller.seek(0.5);
    assert_eq!(*player.seeks.lock(), vec![Duration::from_secs(60)]);
}

#[core_async::test]
async fn streaming_seek_without_duration_is_dropped() {
    let host = Host::streaming();
    let player = host.streaming_player.clone();
    *player.duration.lock() = None;
    let wired = host.wire();
    let controller = wired.controller();
    controller.wait_for_mode().await;

    controller.seek(0.5);
    assert!(player.seeks.lock().is_empty());
    assert_eq!(controller.duration(), 0.0);
}

#[core_async::test]
async fn legacy_streaming_seek_uses_whole_seconds() {
    let host = Host::streaming();
    let player = host.streaming_player.clone();
    let wired = host.wire();
    let controller = wired.controller_with(
        PlaybackConfig::default().with_streaming_seek(StreamingSeekMode::LegacyWholeSeconds),
    );
    controller.wait_for_mode().await;

    controller.seek(42.7);
    assert_eq!(*player.seeks.lock(), vec![Duration::from_secs(42)]);
}

#[core_async::test]
async fn transport_before_mode_resolution_is_ignored() {
    let wired = Host::buffered().wire();
    let controller = wired.controller();

    // The background task has not run yet on this single-threaded runtime.
    assert_eq!(controller.mode(), None);
    controller.play();
    controller.seek(0.3);
    assert_eq!(controller.duration(), 0.0);
    assert_eq!(controller.current_time(), 0.0);
    assert!(!controller.is_ready());

    controller.wait_until_settled().await;
    assert!(!controller.has_pending_play());
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[core_async::test(start_paused)]
async fn observer_is_notified_once_per_second() {
    let host = Host::buffered();
    let player = host.buffered_player.clone();
    *player.position.lock() = Duration::from_secs(7);
    let wired = host.wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_until_settled().await;
    controller.play();
    sleep(Duration::from_millis(3500)).await;

    let updates = observer.updates.lock().clone();
    assert_eq!(updates.len(), 3);
    assert!(updates.iter().all(|(position, total)| *position == 7.0 && total == "03:20"));
}

#[core_async::test(start_paused)]
async fn ticker_started_by_pending_play() {
    let gate = Arc::new(Notify::new());
    let wired = Host::buffered().gated(&gate).wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_for_mode().await;
    controller.play();
    gate.notify_one();
    controller.wait_until_settled().await;

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(observer.count(), 2);
}

#[core_async::test(start_paused)]
async fn ticker_stops_when_playback_stops_and_restarts_on_play() {
    let host = Host::buffered();
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_until_settled().await;
    controller.play();
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(observer.count(), 1);

    player.stop();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(observer.count(), 1);

    controller.play();
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(observer.count(), 2);
}

#[core_async::test(start_paused)]
async fn repeated_play_runs_a_single_ticker() {
    let wired = Host::buffered().wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_until_settled().await;
    controller.play();
    controller.play();
    controller.play();
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(observer.count(), 2);
}

#[core_async::test(start_paused)]
async fn streaming_progress_waits_for_ready_item() {
    let host = Host::streaming();
    let player = host.streaming_player.clone();
    *player.status.lock() = ItemStatus::Unknown;
    *player.position.lock() = Duration::from_secs(12);
    let wired = host.wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_for_mode().await;
    controller.play();
    assert_eq!(*player.plays.lock(), 1);
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(observer.count(), 0);
    assert_eq!(controller.current_time(), 0.0);

    *player.status.lock() = ItemStatus::ReadyToPlay;
    sleep(Duration::from_secs(1)).await;
    assert_eq!(*observer.updates.lock(), vec![(12.0, "02:00".to_string())]);
    assert_eq!(controller.current_time(), 12.0);

    // Between ticks the cached position is served, not the live one.
    *player.position.lock() = Duration::from_secs(20);
    assert_eq!(controller.current_time(), 12.0);
}

#[core_async::test(start_paused)]
async fn streaming_progress_resumes_after_slow_buffering() {
    let host = Host::streaming();
    let player = host.streaming_player.clone();
    *player.status.lock() = ItemStatus::Unknown;
    *player.position.lock() = Duration::from_secs(3);
    let wired = host.wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_for_mode().await;
    controller.play();
    assert!(!player.is_playing());

    // The first tick lands while the item is still buffering.
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(observer.count(), 0);
    *player.status.lock() = ItemStatus::ReadyToPlay;

    sleep(Duration::from_secs(5)).await;
    assert_eq!(observer.count(), 5);
    assert_eq!(controller.current_time(), 3.0);
    assert_eq!(*player.plays.lock(), 1);
}

#[core_async::test(start_paused)]
async fn refused_play_starts_no_ticker() {
    let host = Host {
        buffered_player: FakeBufferedPlayer::refusing(Duration::from_secs(200)),
        ..Host::buffered()
    };
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_until_settled().await;
    controller.play();
    sleep(Duration::from_secs(3)).await;
    assert_eq!(player.plays(), 1);
    assert_eq!(observer.count(), 0);
}

#[core_async::test(start_paused)]
async fn observer_is_held_weakly() {
    let wired = Host::buffered().wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);
    assert_eq!(Arc::strong_count(&observer), 1);

    controller.wait_until_settled().await;
    controller.play();
    drop(observer);

    // Ticks keep running against a dead observer without effect.
    sleep(Duration::from_millis(2500)).await;
    assert!(controller.is_ready());
}

#[core_async::test(start_paused)]
async fn cleared_observer_stops_receiving() {
    let wired = Host::buffered().wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_until_settled().await;
    controller.play();
    sleep(Duration::from_millis(1500)).await;
    controller.clear_observer();
    sleep(Duration::from_secs(3)).await;
    assert_eq!(observer.count(), 1);
}

#[core_async::test(start_paused)]
async fn dropping_controller_stops_ticker() {
    let wired = Host::buffered().wire();
    let controller = wired.controller();
    let observer = Arc::new(RecordingObserver::default());
    controller.set_observer(&observer);

    controller.wait_until_settled().await;
    controller.play();
    sleep(Duration::from_millis(1500)).await;
    drop(controller);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(observer.count(), 1);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[core_async::test]
async fn download_failure_is_terminal() {
    let wired = Host {
        http_status: 404,
        ..Host::buffered()
    }
    .wire();
    let controller = wired.controller();

    assert!(!controller.wait_until_settled().await);
    assert_eq!(controller.mode(), Some(PlaybackMode::Buffered));
    assert!(!controller.is_ready());

    let message = controller.last_error().unwrap();
    assert!(message.contains("404"));
    assert!(!message.contains("media.example.com"));

    controller.play();
    controller.seek(0.5);
    assert!(!controller.has_pending_play());
    assert!(wired.buffered.decoded.lock().is_empty());
}

#[core_async::test]
async fn failure_discards_pending_play() {
    let gate = Arc::new(Notify::new());
    let host = Host {
        decode_rejects: true,
        ..Host::buffered()
    }
    .gated(&gate);
    let player = host.buffered_player.clone();
    let wired = host.wire();
    let controller = wired.controller();

    controller.wait_for_mode().await;
    controller.play();
    gate.notify_one();

    assert!(!controller.wait_until_settled().await);
    assert!(controller
        .last_error()
        .unwrap()
        .contains("unrecognized audio format"));
    assert!(!controller.has_pending_play());
    assert_eq!(player.plays(), 0);
}

#[core_async::test]
async fn download_uses_configured_trust_policy() {
    let wired = Host::buffered().wire();
    let controller = wired.controller();
    controller.wait_until_settled().await;
    assert_eq!(
        wired.http.requests.lock()[0].trust,
        TlsTrustPolicy::AcceptInvalidCertificates
    );

    let strict = wired.controller_with(
        PlaybackConfig::default().with_download_trust(TlsTrustPolicy::VerifyCertificates),
    );
    strict.wait_until_settled().await;
    let requests = wired.http.requests.lock();
    assert_eq!(requests[1].trust, TlsTrustPolicy::VerifyCertificates);
    assert_eq!(requests[1].url, URL);
}

// ---------------------------------------------------------------------------
// Construction and events
// ---------------------------------------------------------------------------

#[test]
fn construction_outside_runtime_is_rejected() {
    let wired = Host::buffered().wire();
    let err = PlaybackController::new(URL, &wired.core, PlaybackConfig::default()).unwrap_err();
    assert!(matches!(err, PlaybackError::PreconditionViolation(_)));
}

#[core_async::test]
async fn invalid_config_is_rejected() {
    let wired = Host::buffered().wire();
    let config = PlaybackConfig::default().with_progress_interval(Duration::ZERO);
    let err = PlaybackController::new(URL, &wired.core, config).unwrap_err();
    assert!(matches!(err, PlaybackError::InvalidConfig(_)));
}

#[core_async::test]
async fn controllers_have_distinct_ids() {
    let wired = Host::buffered().wire();
    let first = wired.controller();
    let second = wired.controller();
    assert_ne!(first.id(), second.id());
    assert_eq!(first.source().as_str(), URL);
}

#[core_async::test(start_paused)]
async fn lifecycle_is_published_on_event_bus() {
    let bus = EventBus::new(32);
    let wired = Host {
        event_bus: Some(bus.clone()),
        ..Host::buffered()
    }
    .wire();
    let controller = wired.controller();
    let mut events = EventStream::new(bus.subscribe()).for_controller(controller.id().to_string());

    controller.wait_until_settled().await;
    controller.play();
    sleep(Duration::from_millis(1500)).await;

    let id = controller.id().to_string();
    assert_eq!(
        events.recv().await.unwrap(),
        PlayerEvent::ModeResolved {
            controller_id: id.clone(),
            mode: PlaybackMode::Buffered,
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        PlayerEvent::Ready {
            controller_id: id.clone(),
            duration_secs: Some(200.0),
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        PlayerEvent::Progress {
            controller_id: id,
            position_secs: 0.0,
            total: "03:20".to_string(),
        }
    );
    assert!(events.try_recv().is_none());
}

#[core_async::test]
async fn failure_is_published_on_event_bus() {
    let bus = EventBus::new(32);
    let wired = Host {
        http_status: 500,
        event_bus: Some(bus.clone()),
        ..Host::buffered()
    }
    .wire();
    let mut events = EventStream::new(bus.subscribe())
        .filter(|event| matches!(event, PlayerEvent::Failed { .. }));
    let controller = wired.controller();

    assert!(!controller.wait_until_settled().await);
    match events.recv().await.unwrap() {
        PlayerEvent::Failed { message, .. } => assert!(message.contains("500")),
        other => panic!("unexpected event {:?}", other),
    }
}
