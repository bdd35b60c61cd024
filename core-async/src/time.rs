//! Time-related abstractions.
//!
//! Re-exports Tokio's timer types. `Instant` is Tokio's instant so that it
//! follows a paused test clock.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{periodic, Duration};
//!
//! async fn example() {
//!     let mut ticker = periodic(Duration::from_secs(1));
//!     // First completion happens one full period from now.
//!     ticker.tick().await;
//! }
//! ```

pub use std::time::Duration;
pub use tokio::time::{
    interval, interval_at, sleep, sleep_until, timeout, Instant, Interval, MissedTickBehavior,
    Sleep, Timeout,
};

/// Creates an interval whose first tick fires one `period` from now.
///
/// Unlike [`interval`], nothing completes immediately. Missed ticks are
/// delayed rather than burst, so a stalled executor never produces a flurry
/// of catch-up callbacks.
///
/// # Panics
///
/// Panics if `period` is zero.
pub fn periodic(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
