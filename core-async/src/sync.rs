//! Synchronization primitives.
//!
//! Async-aware channels plus the cancellation token used to tear down
//! periodic work when its owner goes away.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::watch;
//!
//! async fn example() {
//!     let (tx, mut rx) = watch::channel(None::<u8>);
//!     tx.send_replace(Some(7));
//!     let value = rx.wait_for(Option::is_some).await.unwrap();
//!     assert_eq!(*value, Some(7));
//! }
//! ```

pub use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify};
pub use tokio_util::sync::{CancellationToken, DropGuard};
