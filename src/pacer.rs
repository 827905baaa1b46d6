//! Pacing between replays.
//!
//! The flush loop waits briefly between replays so the transport's own rate
//! limiting is never tripped. The policy sits behind a trait so tests run
//! without wall-clock delays.

use async_trait::async_trait;
use std::time::Duration;

/// Pacing policy applied between consecutive replays.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait before the next replay.
    async fn pause(&self);
}

/// Fixed-interval pacer backed by the tokio timer.
#[derive(Debug, Clone, Copy)]
pub struct IntervalPacer {
    interval: Duration,
}

impl IntervalPacer {
    /// Default pacing between replays.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

    /// Create a pacer with the given interval.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Create a pacer from a millisecond count.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Default for IntervalPacer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Pacer that never waits, for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self) {}
}
