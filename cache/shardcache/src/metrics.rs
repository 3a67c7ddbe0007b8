//! Cache counters.
//!
//! Hot-path counters accumulate in thread-local residuals and publish whole
//! multiples of their batching boundary (see the `metrics` crate). Entry
//! population uses a boundary of 1 so probes converge immediately; request
//! and byte counters tolerate bounded skew in exchange for fewer atomic
//! operations.

use metrics::Counter;
use metriken::metric;

/// Thread-local residual slot indices, one per counter.
pub mod slots {
    /// SET operations.
    pub const SETS: usize = 0;
    /// GET operations.
    pub const GETS: usize = 1;
    /// GET operations that found an indexed entry.
    pub const GET_HITS: usize = 2;
    /// Value bytes written in by SETs.
    pub const BYTES_IN: usize = 3;
    /// Value bytes handed out by GET hits.
    pub const BYTES_OUT: usize = 4;
    /// Value bytes resident.
    pub const VALUE_BYTES: usize = 5;
    /// Entries resident.
    pub const ENTRIES: usize = 6;
    /// Entries reclaimed by sweeps.
    pub const PURGED: usize = 7;
    /// Bytes released by sweeps.
    pub const FREED_BYTES: usize = 8;
}

/// Batching boundary for request and inbound byte counters.
const REQUEST_BOUNDARY: u64 = 100;

/// Batching boundary for the outbound byte counter, the hottest of the set.
const BYTES_OUT_BOUNDARY: u64 = 10_000;

/// Total SET operations.
#[metric(name = "cache_sets", description = "Total SET operations")]
pub static SETS: Counter = Counter::new(slots::SETS, REQUEST_BOUNDARY);

/// Total GET operations.
#[metric(name = "cache_gets", description = "Total GET operations")]
pub static GETS: Counter = Counter::new(slots::GETS, REQUEST_BOUNDARY);

/// GET operations that found an indexed entry.
#[metric(
    name = "cache_get_hits",
    description = "GET operations that found an indexed entry"
)]
pub static GET_HITS: Counter = Counter::new(slots::GET_HITS, REQUEST_BOUNDARY);

/// Value bytes written in by SETs.
#[metric(name = "cache_bytes_in", description = "Value bytes written by SETs")]
pub static BYTES_IN: Counter = Counter::new(slots::BYTES_IN, REQUEST_BOUNDARY);

/// Value bytes handed out by GET hits.
#[metric(
    name = "cache_bytes_out",
    description = "Value bytes handed out by GET hits"
)]
pub static BYTES_OUT: Counter = Counter::new(slots::BYTES_OUT, BYTES_OUT_BOUNDARY);

/// Value bytes resident, including entries awaiting reclamation.
#[metric(
    name = "cache_value_bytes",
    description = "Value bytes resident, including entries awaiting reclamation"
)]
pub static VALUE_BYTES: Counter = Counter::new(slots::VALUE_BYTES, REQUEST_BOUNDARY);

/// Entries resident, including entries awaiting reclamation.
#[metric(
    name = "cache_entries",
    description = "Entries resident, including entries awaiting reclamation"
)]
pub static ENTRIES: Counter = Counter::new(slots::ENTRIES, 1);

/// Entries reclaimed by sweeps.
#[metric(name = "cache_purged", description = "Entries reclaimed by sweeps")]
pub static PURGED: Counter = Counter::new(slots::PURGED, 1);

/// Bytes released by sweeps.
#[metric(name = "cache_freed_bytes", description = "Bytes released by sweeps")]
pub static FREED_BYTES: Counter = Counter::new(slots::FREED_BYTES, 1);

/// Point-in-time snapshot of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// SET operations.
    pub sets: u64,
    /// GET operations.
    pub gets: u64,
    /// GET operations that found an indexed entry.
    pub get_hits: u64,
    /// Value bytes written in by SETs.
    pub bytes_in: u64,
    /// Value bytes handed out by GET hits.
    pub bytes_out: u64,
    /// Value bytes resident, including entries awaiting reclamation.
    pub value_bytes: u64,
    /// Entries resident, including entries awaiting reclamation.
    pub entries: u64,
    /// Entries reclaimed by sweeps.
    pub purged: u64,
    /// Bytes released by sweeps.
    pub freed_bytes: u64,
}

impl CacheStats {
    /// Snapshot the process-wide counters.
    pub fn snapshot() -> Self {
        Self {
            sets: SETS.value(),
            gets: GETS.value(),
            get_hits: GET_HITS.value(),
            bytes_in: BYTES_IN.value(),
            bytes_out: BYTES_OUT.value(),
            value_bytes: VALUE_BYTES.value(),
            entries: ENTRIES.value(),
            purged: PURGED.value(),
            freed_bytes: FREED_BYTES.value(),
        }
    }

    /// Index hit rate as a percentage (0.0 - 100.0).
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            (self.get_hits as f64 / self.gets as f64) * 100.0
        }
    }

    /// Counter movement since an earlier snapshot.
    ///
    /// Monotone counters are differenced; the resident gauges (`entries`,
    /// `value_bytes`) are carried over from `self`.
    pub fn diff(&self, earlier: &CacheStats) -> CacheStats {
        CacheStats {
            sets: self.sets.saturating_sub(earlier.sets),
            gets: self.gets.saturating_sub(earlier.gets),
            get_hits: self.get_hits.saturating_sub(earlier.get_hits),
            bytes_in: self.bytes_in.saturating_sub(earlier.bytes_in),
            bytes_out: self.bytes_out.saturating_sub(earlier.bytes_out),
            value_bytes: self.value_bytes,
            entries: self.entries,
            purged: self.purged.saturating_sub(earlier.purged),
            freed_bytes: self.freed_bytes.saturating_sub(earlier.freed_bytes),
        }
    }
}
