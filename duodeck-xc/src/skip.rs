//! Skip requests ("crossfade now")
//!
//! A skip request is a coalescing credit: requests that arrive while the
//! scheduler is busy accumulate, and the scheduler claims all of them at
//! once. The only way a credit survives a claim is [`SkipSignal::carry_forward`],
//! which the scheduler uses when a skip lands in the overlap hold of a
//! transition that is already underway.
//!
//! Requests may come from any task or signal handler; claims only from the
//! scheduler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{sleep_until, Instant};

struct SkipInner {
    /// Unclaimed skip credits
    credits: AtomicU64,
    /// Total requests ever received
    received: AtomicU64,
    wake: Notify,
}

/// Shared skip request counter with a wake-up for interruptible waits
#[derive(Clone)]
pub struct SkipSignal {
    inner: Arc<SkipInner>,
}

/// Credits taken by one [`SkipSignal::claim`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipClaim {
    /// Requests that collapsed into this claim (always at least 1)
    pub coalesced: u64,
}

/// Why an interruptible wait returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A skip was requested (or a stale wake-up was pending)
    Signalled,
    TimedOut,
}

impl Default for SkipSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SkipSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SkipInner {
                credits: AtomicU64::new(0),
                received: AtomicU64::new(0),
                wake: Notify::new(),
            }),
        }
    }

    /// Record one skip request and wake the scheduler
    ///
    /// Returns the number of unclaimed credits after this request.
    pub fn request(&self) -> u64 {
        self.inner.received.fetch_add(1, Ordering::Relaxed);
        let pending = self.inner.credits.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.wake.notify_one();
        pending
    }

    /// Take every pending credit at once
    pub fn claim(&self) -> Option<SkipClaim> {
        match self.inner.credits.swap(0, Ordering::AcqRel) {
            0 => None,
            coalesced => Some(SkipClaim { coalesced }),
        }
    }

    /// Defer one claimed skip to the next cycle
    ///
    /// Leaves at least one credit pending; requests that arrived since the
    /// claim coalesce with it.
    pub fn carry_forward(&self) {
        let _ = self
            .inner
            .credits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n == 0).then_some(1));
    }

    /// Unclaimed credits
    pub fn pending(&self) -> u64 {
        self.inner.credits.load(Ordering::Acquire)
    }

    /// Total requests received since startup
    pub fn received(&self) -> u64 {
        self.inner.received.load(Ordering::Relaxed)
    }

    /// Sleep for `timeout`, returning early when a skip is requested
    pub async fn wait(&self, timeout: Duration) -> Wake {
        self.wait_until(Instant::now() + timeout).await
    }

    /// Sleep until `deadline`, returning early when a skip is requested
    ///
    /// A request made before the wait started (and not yet waited on) wakes
    /// it immediately, so a request racing the start of a wait is not missed.
    /// Callers re-check [`SkipSignal::claim`] after every wake.
    pub async fn wait_until(&self, deadline: Instant) -> Wake {
        tokio::select! {
            _ = self.inner.wake.notified() => Wake::Signalled,
            _ = sleep_until(deadline) => Wake::TimedOut,
        }
    }
}
