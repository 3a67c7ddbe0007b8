//! Thread-batched metrics with metriken integration.
//!
//! This crate provides [`Counter`] for high-throughput statistics that avoid
//! contention by accumulating in thread-local residuals and flushing whole
//! multiples of a batching boundary into a process-wide atomic.
//!
//! # Overview
//!
//! Each [`Counter`] owns one process-wide total and references a thread-local
//! residual slot (selected by a caller-assigned slot index). Increments land
//! in the residual; once it reaches the counter's boundary, the accumulated
//! multiple of the boundary is published with a single `fetch_add` and the
//! remainder stays local. A reader of the total therefore lags the truth by
//! at most `boundary × thread_count`.
//!
//! A [`Counter`] implements [`metriken::Metric`], allowing it to be
//! registered with the `#[metric]` attribute for exposition.
//!
//! # Example
//!
//! ```
//! use metrics::Counter;
//!
//! // Define named slot constants for clarity
//! mod slots {
//!     pub const GETS: usize = 0;
//!     pub const SETS: usize = 1;
//! }
//!
//! // Counters with their batching boundaries
//! static GETS: Counter = Counter::new(slots::GETS, 100);
//! static SETS: Counter = Counter::new(slots::SETS, 1);
//!
//! // Use in hot path
//! GETS.increment();
//! SETS.add(1);
//!
//! // A boundary of 1 publishes immediately
//! assert_eq!(SETS.value(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod counter;

pub use counter::{Counter, MAX_SLOTS};

// Re-export metriken for convenience
pub use metriken;
