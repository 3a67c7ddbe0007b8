//! Batched counter implementation.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of thread-local residual slots available to counters.
pub const MAX_SLOTS: usize = 16;

thread_local! {
    /// Per-thread residuals, indexed by each counter's slot.
    static RESIDUALS: [Cell<u64>; MAX_SLOTS] = const { [const { Cell::new(0) }; MAX_SLOTS] };
}

/// A process-wide counter with thread-local batching.
///
/// Increments accumulate in the calling thread's residual slot; whole
/// multiples of the batching boundary are published to the shared total with
/// one `fetch_add`. A boundary of 1 publishes every increment directly.
///
/// Slots are caller-assigned and must be unique per counter: two counters
/// sharing a slot would mix their residuals.
pub struct Counter {
    total: AtomicU64,
    slot: usize,
    boundary: u64,
}

impl Counter {
    /// Create a counter using the given residual slot and batching boundary.
    ///
    /// Panics if `slot` is out of range or `boundary` is zero.
    pub const fn new(slot: usize, boundary: u64) -> Self {
        assert!(slot < MAX_SLOTS, "counter slot out of range");
        assert!(boundary > 0, "batching boundary must be nonzero");
        Self {
            total: AtomicU64::new(0),
            slot,
            boundary,
        }
    }

    /// Add `n` to the counter.
    ///
    /// The shared total is only touched when the thread's residual crosses
    /// the batching boundary.
    #[inline]
    pub fn add(&self, n: u64) {
        if self.boundary == 1 {
            self.total.fetch_add(n, Ordering::Relaxed);
            return;
        }
        RESIDUALS.with(|residuals| {
            let cell = &residuals[self.slot];
            let accumulated = cell.get() + n;
            if accumulated >= self.boundary {
                let publish = accumulated - accumulated % self.boundary;
                self.total.fetch_add(publish, Ordering::Relaxed);
                cell.set(accumulated - publish);
            } else {
                cell.set(accumulated);
            }
        });
    }

    /// Add one to the counter.
    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }

    /// Subtract `n` from the shared total directly.
    ///
    /// Decrements bypass the residual: every shrink path in the cache runs
    /// under a shard's exclusive lock, where contention is already paid for.
    #[inline]
    pub fn sub(&self, n: u64) {
        self.total.fetch_sub(n, Ordering::Relaxed);
    }

    /// Read the published total.
    ///
    /// Lags the true count by at most `boundary × thread_count`.
    pub fn value(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl metriken::Metric for Counter {
    fn as_any(&self) -> Option<&dyn std::any::Any> {
        Some(self)
    }

    fn value(&self) -> Option<metriken::Value<'_>> {
        Some(metriken::Value::Counter(Counter::value(self)))
    }
}
