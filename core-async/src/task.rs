//! Task spawning abstractions.
//!
//! Probing, downloading and progress ticking all run as spawned tasks; the
//! caller-facing playback API never awaits them directly.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// The spawned task may run on a different thread, so both the future and
/// its output must be `Send`.
///
/// # Panics
///
/// Panics when called outside a runtime context. Use
/// [`crate::runtime::in_runtime`] to check first.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
