//! # Event Bus System
//!
//! Broadcasts playback lifecycle events using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The progress observer is a single weakly held callback. Anything else that
//! wants to follow a controller (analytics, a now-playing widget, a test
//! harness) subscribes to the [`EventBus`] instead:
//!
//! - **Event Types**: [`PlayerEvent`], one variant per lifecycle step
//! - **EventBus**: Central broadcast channel, cheap to clone
//! - **EventStream**: Receiver wrapper with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   emit    ┌───────────┐   subscribe   ┌────────────┐
//! │ Controller ├──────────>│ EventBus  ├──────────────>│ Subscriber │
//! └────────────┘           │ (broadcast│               └────────────┘
//! ┌────────────┐   emit    │  channel) │   subscribe   ┌────────────┐
//! │ Controller ├──────────>│           ├──────────────>│ Subscriber │
//! └────────────┘           └───────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventStream, PlayerEvent};
//!
//! let bus = EventBus::new(32);
//! let mut failures = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, PlayerEvent::Failed { .. }));
//!
//! bus.emit(PlayerEvent::Failed {
//!     controller_id: "c-1".to_string(),
//!     message: "download failed".to_string(),
//! })
//! .ok();
//!
//! assert!(failures.try_recv().is_some());
//! ```
//!
//! Emitting with no subscribers returns an error that callers ignore.

use bridge_traits::playback::PlaybackMode;
use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use broadcast::error::{RecvError, SendError};
pub use broadcast::Receiver;

/// Default buffer size for event bus channels.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Player Events
// ============================================================================

/// Lifecycle events published by a playback controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum PlayerEvent {
    /// Mode detection finished and a backend was chosen.
    ModeResolved {
        controller_id: String,
        mode: PlaybackMode,
    },
    /// The backend can report position and duration.
    Ready {
        controller_id: String,
        /// Total duration when known.
        duration_secs: Option<f64>,
    },
    /// Periodic position update, mirrored from the progress observer.
    Progress {
        controller_id: String,
        position_secs: f64,
        /// Formatted total as handed to the observer, `MM:SS`.
        total: String,
    },
    /// The source can no longer be played by this controller.
    Failed {
        controller_id: String,
        message: String,
    },
}

impl PlayerEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::ModeResolved { .. } => "Playback mode resolved",
            PlayerEvent::Ready { .. } => "Playback ready",
            PlayerEvent::Progress { .. } => "Playback progress",
            PlayerEvent::Failed { .. } => "Playback failed",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayerEvent::Failed { .. } => EventSeverity::Error,
            PlayerEvent::ModeResolved { .. } | PlayerEvent::Ready { .. } => EventSeverity::Info,
            PlayerEvent::Progress { .. } => EventSeverity::Debug,
        }
    }

    /// Identifier of the controller that published the event.
    pub fn controller_id(&self) -> &str {
        match self {
            PlayerEvent::ModeResolved { controller_id, .. }
            | PlayerEvent::Ready { controller_id, .. }
            | PlayerEvent::Progress { controller_id, .. }
            | PlayerEvent::Failed { controller_id, .. } => controller_id,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events it
    /// receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: PlayerEvent) -> Result<usize, SendError<PlayerEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&PlayerEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering.
pub struct EventStream {
    receiver: Receiver<PlayerEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<PlayerEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PlayerEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Restrict the stream to a single controller.
    pub fn for_controller(self, controller_id: impl Into<String>) -> Self {
        let controller_id = controller_id.into();
        self.filter(move |event| event.controller_id() == controller_id)
    }

    fn matches(&self, event: &PlayerEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<PlayerEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<PlayerEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
