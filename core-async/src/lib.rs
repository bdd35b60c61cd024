//! Runtime-agnostic async abstraction layer for the hybrid playback core.
//!
//! Downstream crates (`core-playback`, `core-runtime`, the bridges) depend on
//! this crate instead of naming Tokio directly. Everything here is a thin
//! re-export or helper over Tokio so a different executor can be swapped in at
//! one place.
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Timers (sleep, timeouts, periodic tickers)
//! - `sync`: Channels and cancellation
//! - `runtime`: Blocking entry points used by the attribute macros
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
