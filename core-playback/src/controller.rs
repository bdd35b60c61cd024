//! The playback controller.
//!
//! Construction spawns one background task that probes the source, installs
//! exactly one backend, and for buffered sources downloads and decodes the
//! payload. Transport calls never wait on that task: they act on whatever
//! state exists when they are made.
//!
//! ```text
//!  Undetermined ── probe ok ──────────────────> Streaming
//!       │
//!       │ probe negative, probe error, engine refused
//!       v
//!  Buffered(Loading) ── decoded ──────────────> Buffered(Ready)
//!       │
//!       │ fetch or decode failed
//!       v
//!  Buffered(Failed)
//! ```

use std::sync::{Arc, Weak};

use bridge_traits::error::BridgeError;
use bridge_traits::http::HttpRequest;
use bridge_traits::playback::{BufferedPlayer, PlaybackMode};
use core_async::runtime;
use core_async::sync::{watch, CancellationToken};
use core_async::task;
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, PlayerEvent};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::backend::{ActiveBackend, BufferedBackend, PlayOutcome, StreamingBackend, TickOutcome};
use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::mode::detect_mode;
use crate::observer::{format_mm_ss, ProgressObserver};
use crate::progress::{run_ticker, until_cancelled, Tick};
use crate::source::{ControllerId, PlaybackSource};

/// Plays one remote audio source, streaming it when possible and
/// downloading it first otherwise.
///
/// # Example
///
/// ```ignore
/// use core_playback::{PlaybackConfig, PlaybackController};
///
/// let controller = PlaybackController::new(
///     "https://cdn.example.com/episode.mp3",
///     &core_config,
///     PlaybackConfig::default(),
/// )?;
/// controller.set_observer(&observer);
/// controller.play(); // queued if the download is still running
/// ```
pub struct PlaybackController {
    inner: Arc<Inner>,
}

struct Inner {
    id: ControllerId,
    source: PlaybackSource,
    config: PlaybackConfig,
    event_bus: Option<EventBus>,
    state: Mutex<State>,
    observer: Mutex<Option<Weak<dyn ProgressObserver>>>,
    mode_tx: watch::Sender<Option<PlaybackMode>>,
    settled_tx: watch::Sender<Option<bool>>,
    shutdown: CancellationToken,
}

#[derive(Default)]
struct State {
    backend: Option<ActiveBackend>,
    ticker_running: bool,
    last_error: Option<String>,
}

impl PlaybackController {
    /// Create a controller and start mode detection in the background.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::InvalidConfig`] if `config` fails validation
    /// - [`PlaybackError::PreconditionViolation`] when called outside an
    ///   async runtime
    pub fn new(
        source: impl Into<PlaybackSource>,
        core: &CoreConfig,
        config: PlaybackConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !runtime::in_runtime() {
            return Err(PlaybackError::PreconditionViolation(
                "PlaybackController::new must be called inside an async runtime",
            ));
        }

        let source = source.into();
        let id = ControllerId::new();
        let (mode_tx, _) = watch::channel(None);
        let (settled_tx, _) = watch::channel(None);

        let inner = Arc::new(Inner {
            id,
            source: source.clone(),
            config: config.clone(),
            event_bus: core.event_bus.clone(),
            state: Mutex::new(State::default()),
            observer: Mutex::new(None),
            mode_tx,
            settled_tx,
            shutdown: CancellationToken::new(),
        });

        info!(controller_id = %id, url = %source, "Created playback controller");

        task::spawn(resolve(
            Arc::downgrade(&inner),
            core.clone(),
            source,
            id,
            config,
            inner.shutdown.clone(),
        ));

        Ok(Self { inner })
    }

    pub fn id(&self) -> ControllerId {
        self.inner.id
    }

    pub fn source(&self) -> &PlaybackSource {
        &self.inner.source
    }

    /// `None` until detection finishes. Never changes once set.
    pub fn mode(&self) -> Option<PlaybackMode> {
        self.inner.state.lock().backend.as_ref().map(ActiveBackend::mode)
    }

    /// Streaming is ready as soon as its backend exists; buffered once the
    /// payload has been decoded.
    pub fn is_ready(&self) -> bool {
        self.inner
            .state
            .lock()
            .backend
            .as_ref()
            .is_some_and(ActiveBackend::is_ready)
    }

    /// Whether a `play()` is waiting for the buffered payload.
    pub fn has_pending_play(&self) -> bool {
        matches!(
            self.inner.state.lock().backend,
            Some(ActiveBackend::Buffered(ref backend)) if backend.has_pending_play()
        )
    }

    /// Message of the terminal failure, if loading failed.
    pub fn last_error(&self) -> Option<String> {
        self.inner.state.lock().last_error.clone()
    }

    /// Start or resume playback.
    ///
    /// A buffered source that is still loading remembers the request and
    /// starts once ready; a later call replaces an earlier one. Calls made
    /// before the mode is known are dropped.
    pub fn play(&self) {
        let outcome = self.inner.with_backend(|backend| backend.play());
        match outcome {
            Ok(PlayOutcome::Started) => self.inner.start_ticker(),
            Ok(PlayOutcome::Queued) => {
                debug!(controller_id = %self.inner.id, "Queued play until buffered source is ready")
            }
            Ok(PlayOutcome::Refused) => {
                warn!(controller_id = %self.inner.id, "Buffered player refused to start")
            }
            Err(err) => debug!(controller_id = %self.inner.id, error = %err, "Ignoring play"),
        }
    }

    /// Seek to `fraction` of the way through the source.
    ///
    /// Dropped before the backend can serve it. Streaming sources follow
    /// [`PlaybackConfig::streaming_seek`].
    pub fn seek(&self, fraction: f64) {
        let seek_mode = self.inner.config.streaming_seek;
        if let Err(err) = self
            .inner
            .with_backend(|backend| backend.seek(fraction, seek_mode))
        {
            debug!(controller_id = %self.inner.id, fraction, error = %err, "Ignoring seek");
        }
    }

    /// Total duration in seconds, `0.0` while unknown.
    pub fn duration(&self) -> f64 {
        self.inner
            .state
            .lock()
            .backend
            .as_ref()
            .map_or(0.0, ActiveBackend::duration_secs)
    }

    /// Playback position in seconds.
    ///
    /// For streaming sources this is the position seen by the most recent
    /// progress tick, not a live query.
    pub fn current_time(&self) -> f64 {
        self.inner
            .state
            .lock()
            .backend
            .as_ref()
            .map_or(0.0, ActiveBackend::current_time_secs)
    }

    /// Register a progress observer. Only a weak reference is kept.
    pub fn set_observer<O: ProgressObserver + 'static>(&self, observer: &Arc<O>) {
        let weak: Weak<O> = Arc::downgrade(observer);
        let weak: Weak<dyn ProgressObserver> = weak;
        *self.inner.observer.lock() = Some(weak);
    }

    pub fn clear_observer(&self) {
        *self.inner.observer.lock() = None;
    }

    /// Wait until mode detection has finished.
    pub async fn wait_for_mode(&self) -> PlaybackMode {
        let mut rx = self.inner.mode_tx.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        let resolved = rx.wait_for(Option::is_some).await.ok().and_then(|mode| *mode);
        resolved.unwrap_or(PlaybackMode::Buffered)
    }

    /// Wait until the controller is ready (`true`) or loading failed
    /// for good (`false`).
    pub async fn wait_until_settled(&self) -> bool {
        let mut rx = self.inner.settled_tx.subscribe();
        let settled = rx.wait_for(Option::is_some).await.ok().and_then(|ready| *ready);
        settled.unwrap_or(false)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("id", &self.inner.id)
            .field("source", &self.inner.source)
            .field("mode", &self.mode())
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl Inner {
    fn with_backend<T>(&self, f: impl FnOnce(&mut ActiveBackend) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock();
        match state.backend.as_mut() {
            Some(backend) => f(backend),
            None => Err(PlaybackError::PreconditionViolation(
                "playback mode not resolved",
            )),
        }
    }

    fn publish(&self, event: PlayerEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is fine.
            bus.emit(event).ok();
        }
    }

    fn mark_settled(&self, ready: bool) {
        self.settled_tx.send_if_modified(|settled| {
            if settled.is_some() {
                return false;
            }
            *settled = Some(ready);
            true
        });
    }

    /// Install the backend for the resolved mode. Later calls are ignored.
    fn install(&self, backend: ActiveBackend) {
        let mode = backend.mode();
        let ready = backend.is_ready();
        let duration = backend.duration_secs();

        {
            let mut state = self.state.lock();
            if let Some(existing) = &state.backend {
                warn!(
                    controller_id = %self.id,
                    resolved = %existing.mode(),
                    ignored = %mode,
                    "Playback mode already resolved"
                );
                return;
            }
            state.backend = Some(backend);
        }

        self.mode_tx.send_replace(Some(mode));
        info!(controller_id = %self.id, mode = %mode, "Playback mode resolved");
        self.publish(PlayerEvent::ModeResolved {
            controller_id: self.id.to_string(),
            mode,
        });

        if ready {
            self.mark_settled(true);
            self.publish(PlayerEvent::Ready {
                controller_id: self.id.to_string(),
                duration_secs: (duration > 0.0).then_some(duration),
            });
        }
    }

    fn finish_loading(self: &Arc<Self>, result: Result<Arc<dyn BufferedPlayer>>) {
        match result {
            Ok(player) => self.buffered_ready(player),
            Err(err) => self.buffered_failed(err),
        }
    }

    fn buffered_ready(self: &Arc<Self>, player: Arc<dyn BufferedPlayer>) {
        let started = {
            let mut state = self.state.lock();
            let Some(ActiveBackend::Buffered(backend)) = state.backend.as_mut() else {
                return;
            };
            let pending = backend.mark_ready(Arc::clone(&player));
            player.set_volume(self.config.buffered_volume);
            match pending {
                Some(play) => {
                    debug!(controller_id = %self.id, "Firing queued play");
                    play(player.as_ref())
                }
                None => false,
            }
        };

        let duration = player.duration().as_secs_f64();
        info!(controller_id = %self.id, "Buffered total time {}", format_mm_ss(duration));
        self.mark_settled(true);
        self.publish(PlayerEvent::Ready {
            controller_id: self.id.to_string(),
            duration_secs: Some(duration),
        });

        if started {
            self.start_ticker();
        }
    }

    fn buffered_failed(&self, err: PlaybackError) {
        error!(controller_id = %self.id, error = %err, "Buffered source failed to load");
        let message = err.to_string();
        {
            let mut state = self.state.lock();
            if let Some(ActiveBackend::Buffered(backend)) = state.backend.as_mut() {
                backend.mark_failed();
            }
            state.last_error = Some(message.clone());
        }
        self.mark_settled(false);
        self.publish(PlayerEvent::Failed {
            controller_id: self.id.to_string(),
            message,
        });
    }

    fn start_ticker(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if state.ticker_running {
                return;
            }
            state.ticker_running = true;
        }

        debug!(controller_id = %self.id, "Starting progress ticker");
        task::spawn(run_ticker(
            Arc::downgrade(self),
            self.shutdown.child_token(),
            self.config.progress_interval,
        ));
    }

    fn notify(&self, position_secs: f64, total: String) {
        let observer = self.observer.lock().as_ref().and_then(Weak::upgrade);
        if let Some(observer) = observer {
            observer.on_progress(position_secs, &total);
        }

        self.publish(PlayerEvent::Progress {
            controller_id: self.id.to_string(),
            position_secs,
            total,
        });
    }
}

impl Tick for Inner {
    fn tick(&self) -> bool {
        let outcome = {
            let mut state = self.state.lock();
            let outcome = state
                .backend
                .as_mut()
                .map_or(TickOutcome::Stop, ActiveBackend::tick);
            if outcome == TickOutcome::Stop {
                state.ticker_running = false;
            }
            outcome
        };

        match outcome {
            TickOutcome::Emit {
                position_secs,
                total,
            } => {
                self.notify(position_secs, total);
                true
            }
            TickOutcome::Skip => true,
            TickOutcome::Stop => {
                debug!(controller_id = %self.id, "Playback stopped, progress ticker exiting");
                false
            }
        }
    }
}

/// Background resolution: probe, install a backend, load buffered payloads.
async fn resolve(
    inner: Weak<Inner>,
    core: CoreConfig,
    source: PlaybackSource,
    id: ControllerId,
    config: PlaybackConfig,
    shutdown: CancellationToken,
) {
    let detection = detect_mode(core.asset_prober.as_ref(), &source, id);
    let Some(mode) = until_cancelled(&shutdown, detection).await else {
        return;
    };

    if mode == PlaybackMode::Streaming {
        match core.streaming_engine.open(source.as_str()) {
            Ok(player) => {
                if let Some(inner) = inner.upgrade() {
                    inner.install(ActiveBackend::Streaming(StreamingBackend::new(player)));
                }
                return;
            }
            Err(err) => {
                let err = PlaybackError::from(err);
                warn!(controller_id = %id, error = %err, "Streaming engine refused source, falling back to buffered");
            }
        }
    }

    match inner.upgrade() {
        Some(inner) => inner.install(ActiveBackend::Buffered(BufferedBackend::loading())),
        None => return,
    }

    let load = load_buffered(&core, &source, id, &config);
    let Some(result) = until_cancelled(&shutdown, load).await else {
        return;
    };
    if let Some(inner) = inner.upgrade() {
        inner.finish_loading(result);
    }
}

#[instrument(skip_all, fields(controller_id = %id, url = %source))]
async fn load_buffered(
    core: &CoreConfig,
    source: &PlaybackSource,
    id: ControllerId,
    config: &PlaybackConfig,
) -> Result<Arc<dyn BufferedPlayer>> {
    if config.download_trust.is_permissive() {
        warn!("Downloading with certificate validation disabled");
    }

    let request = HttpRequest::get(source.as_str()).trust(config.download_trust);
    let payload = core
        .http_client
        .fetch_bytes(request)
        .await
        .map_err(|err| match err {
            // The bridge error embeds the full URL.
            BridgeError::Http { status, .. } => {
                PlaybackError::FetchFailed(format!("HTTP status {}", status))
            }
            other => PlaybackError::FetchFailed(other.to_string()),
        })?;
    debug!(bytes = payload.len(), "Download complete");

    core.buffered_engine
        .activate_session()
        .await
        .map_err(|err| PlaybackError::DecodeFailed(format!("audio session: {}", err)))?;

    core.buffered_engine
        .decode(payload)
        .await
        .map_err(|err| PlaybackError::DecodeFailed(err.to_string()))
}
