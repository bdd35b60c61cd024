//! Runtime utilities that abstract over the underlying async executor.
//!
//! The attribute macros in `core-async-macros` expand to calls into this
//! module, so tests and binaries never construct a Tokio runtime by hand.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Returns `true` when called from within a runtime context.
///
/// Constructors that spawn background work use this to fail with a
/// descriptive error instead of panicking inside `spawn`.
pub fn in_runtime() -> bool {
    Handle::try_current().is_ok()
}
