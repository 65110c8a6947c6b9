//! # Shutdown Signal
//!
//! A single process-wide stop flag shared by the render loop and the
//! ingestion channel. It is set exactly once (window close or Ctrl+C) and
//! never cleared.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative, once-settable stop flag.
///
/// Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl ShutdownSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown.
    ///
    /// Returns `true` only for the call that actually set the flag, so callers
    /// can log the transition once.
    pub fn trigger(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Drive `fut` to completion unless shutdown is requested first.
    ///
    /// The flag is checked before the first poll and then every
    /// `poll_interval`, so an idle future delays shutdown by at most one
    /// interval. Returns `None` when shutdown won.
    pub async fn until_triggered<F>(&self, fut: F, poll_interval: Duration) -> Option<F::Output>
    where
        F: Future,
    {
        if self.is_triggered() {
            return None;
        }

        tokio::pin!(fut);
        let mut ticker = tokio::time::interval(poll_interval);

        loop {
            tokio::select! {
                biased;
                out = &mut fut => return Some(out),
                _ = ticker.tick() => {
                    if self.is_triggered() {
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_trigger_sets_once() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());
        assert!(signal.trigger());
        assert!(signal.is_triggered());
        assert!(!signal.trigger(), "Second trigger must not report a transition");
        assert!(signal.is_triggered());
    }

    #[test]
    fn test_clones_share_flag() {
        let signal = ShutdownSignal::new();
        let other = signal.clone();
        other.trigger();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_ready_future_completes() {
        let signal = ShutdownSignal::new();
        let out = signal
            .until_triggered(async { 42 }, Duration::from_millis(10))
            .await;
        assert_eq!(out, Some(42));
    }

    #[tokio::test]
    async fn test_already_triggered_skips_future() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        let out = signal
            .until_triggered(async { 42 }, Duration::from_millis(10))
            .await;
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn test_pending_future_observes_trigger() {
        let signal = ShutdownSignal::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.trigger();
        });

        let started = Instant::now();
        let out = signal
            .until_triggered(std::future::pending::<()>(), Duration::from_millis(10))
            .await;

        assert_eq!(out, None);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
