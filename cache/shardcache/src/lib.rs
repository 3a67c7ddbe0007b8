//! Sharded in-memory TTL cache for database query results.
//!
//! Callers store an opaque byte value under an opaque byte key with an
//! expiration; reads return a fresh copy of the value while it is live. A
//! background reclaimer sweeps expired entries to hold resident memory near
//! a configured ceiling.
//!
//! # Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                        ShardedCache                          |
//! |                                                              |
//! |  key bytes -> 64-bit fingerprint -> shard (fingerprint % 32) |
//! |                                                              |
//! |  +--------- Shard 0 ----------+        +----- Shard 31 ----+ |
//! |  | RwLock                     |  ....  |                   | |
//! |  |  map: fingerprint -> entry |        |                   | |
//! |  |  seq: insertion order      |        |                   | |
//! |  +----------------------------+        +-------------------+ |
//! |          ^                                                   |
//! |          | purge_some(now) per tick                          |
//! |  +-------+------+                                            |
//! |  |  Reclaimer   |  sleep, gate on used memory, sweep         |
//! |  +--------------+                                            |
//! +--------------------------------------------------------------+
//! ```
//!
//! Keys are reduced to fingerprints; raw key bytes are not retained, and
//! fingerprint collisions are treated as key identity. The hasher and the
//! time source are injected, so both stay interchangeable.
//!
//! # Example
//!
//! ```
//! use shardcache::ShardedCache;
//!
//! let cache = ShardedCache::new();
//! cache.set(b"key", b"value", 60).unwrap();
//! assert_eq!(cache.get(b"key").as_deref(), Some(&b"value"[..]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cache;
mod clock;
mod config;
mod entry;
mod error;
pub mod ffi;
pub mod metrics;
mod reclaimer;
mod shard;

pub use cache::{
    MAX_RELATIVE_EXPIRE, SHARD_COUNT, ShardedCache, ShardedCacheBuilder, version_banner,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use entry::{ENTRY_OVERHEAD, EXPIRE_DROPPED, Entry};
pub use error::{CacheError, CacheResult};
pub use metrics::CacheStats;
pub use reclaimer::Reclaimer;
pub use shard::Shard;
