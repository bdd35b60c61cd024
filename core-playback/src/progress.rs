//! Periodic progress ticker.
//!
//! The ticker holds only a `Weak` reference to its target and exits when the
//! target is gone, when the target reports that playback stopped, or when its
//! cancellation token fires.

use std::future::Future;
use std::sync::Weak;
use std::time::Duration;

use core_async::sync::CancellationToken;
use core_async::time::periodic;
use futures::future::{select, Either};
use futures::pin_mut;

/// Something driven by progress ticks.
pub(crate) trait Tick: Send + Sync {
    /// Handle one tick. Returning `false` ends the ticker.
    fn tick(&self) -> bool;
}

/// Run `future` unless `token` is cancelled first.
pub(crate) async fn until_cancelled<F: Future>(
    token: &CancellationToken,
    future: F,
) -> Option<F::Output> {
    let cancelled = token.cancelled();
    pin_mut!(future, cancelled);
    match select(future, cancelled).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(_) => None,
    }
}

/// Tick `target` every `period`, starting one period from now.
pub(crate) async fn run_ticker<T: Tick>(target: Weak<T>, token: CancellationToken, period: Duration) {
    let mut ticker = periodic(period);
    loop {
        if until_cancelled(&token, ticker.tick()).await.is_none() {
            break;
        }
        let Some(target) = target.upgrade() else {
            break;
        };
        if !target.tick() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_async::time::{sleep, Instant};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Countdown {
        remaining: Mutex<u32>,
        ticks: Mutex<Vec<Instant>>,
    }

    impl Countdown {
        fn new(remaining: u32) -> Arc<Self> {
            Arc::new(Self {
                remaining: Mutex::new(remaining),
                ticks: Mutex::new(Vec::new()),
            })
        }
    }

    impl Tick for Countdown {
        fn tick(&self) -> bool {
            self.ticks.lock().push(Instant::now());
            let mut remaining = self.remaining.lock();
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        }
    }

    #[core_async::test(start_paused)]
    async fn ticks_once_per_period_until_target_stops() {
        let target = Countdown::new(3);
        let start = Instant::now();

        core_async::spawn(run_ticker(
            Arc::downgrade(&target),
            CancellationToken::new(),
            Duration::from_secs(1),
        ))
        .await
        .unwrap();

        let offsets: Vec<_> = target.ticks.lock().iter().map(|t| *t - start).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3)
            ]
        );
    }

    #[core_async::test(start_paused)]
    async fn exits_when_target_dropped() {
        let target = Countdown::new(u32::MAX);
        let handle = core_async::spawn(run_ticker(
            Arc::downgrade(&target),
            CancellationToken::new(),
            Duration::from_secs(1),
        ));

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(target.ticks.lock().len(), 2);
        drop(target);

        handle.await.unwrap();
    }

    #[core_async::test(start_paused)]
    async fn exits_on_cancellation() {
        let target = Countdown::new(u32::MAX);
        let token = CancellationToken::new();
        let handle = core_async::spawn(run_ticker(
            Arc::downgrade(&target),
            token.clone(),
            Duration::from_secs(1),
        ));

        sleep(Duration::from_millis(1500)).await;
        token.cancel();
        handle.await.unwrap();

        sleep(Duration::from_secs(5)).await;
        assert_eq!(target.ticks.lock().len(), 1);
    }

    #[core_async::test]
    async fn until_cancelled_returns_output() {
        let token = CancellationToken::new();
        assert_eq!(until_cancelled(&token, async { 7 }).await, Some(7));

        token.cancel();
        assert_eq!(
            until_cancelled(&token, std::future::pending::<u8>()).await,
            None
        );
    }
}
