//! Cache facade: fingerprint routing over the shard set.

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::entry::Entry;
use crate::error::CacheResult;
use crate::shard::Shard;
use ahash::RandomState;
use std::hash::BuildHasher;
use std::sync::Arc;

/// Number of independent shards; an operation is routed by
/// `fingerprint % SHARD_COUNT`.
pub const SHARD_COUNT: usize = 32;

/// Expire arguments above this many seconds (ten years) are absolute epoch
/// deadlines; smaller arguments are durations relative to now.
pub const MAX_RELATIVE_EXPIRE: i64 = 3600 * 24 * 365 * 10;

/// Sharded in-memory TTL cache for opaque byte values.
///
/// Keys are reduced to 64-bit fingerprints by the injected hasher; the raw
/// key bytes are not retained, so two keys with the same fingerprint are the
/// same logical key and a set on one displaces the other. Values are copied
/// in on `set` and copied out on `get`.
///
/// The cache itself never evicts on the write path. Expired entries become
/// misses immediately, and their memory is released by periodic sweeps:
/// either a [`Reclaimer`](crate::Reclaimer) thread driving
/// [`ShardedCache::purge_tick`], or the host calling it directly.
pub struct ShardedCache<S: BuildHasher = RandomState> {
    shards: [Shard; SHARD_COUNT],
    hasher: S,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
}

impl ShardedCache<RandomState> {
    /// Create a cache with the default configuration, hasher, and clock.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder with the default configuration.
    pub fn builder() -> ShardedCacheBuilder<RandomState> {
        ShardedCacheBuilder::new()
    }
}

impl Default for ShardedCache<RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher> ShardedCache<S> {
    #[inline]
    fn fingerprint(&self, key: &[u8]) -> u64 {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn shard(&self, fingerprint: u64) -> &Shard {
        &self.shards[(fingerprint % SHARD_COUNT as u64) as usize]
    }

    /// Look up `key` and return a fresh copy of its value.
    ///
    /// Absent and expired entries are misses. A failed allocation of the
    /// result buffer also degrades to a miss; no error crosses this
    /// boundary.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let entry = self.lookup(key)?;
        let now = self.clock.now();
        if !entry.is_live(now) {
            return None;
        }
        let mut copy = Vec::new();
        copy.try_reserve_exact(entry.value().len()).ok()?;
        copy.extend_from_slice(entry.value());
        entry.touch(now);
        Some(copy)
    }

    /// Take a read borrow of the entry indexed under `key` without copying.
    ///
    /// The borrow keeps the entry's bytes alive even across supersession and
    /// sweeps; drop it to release. Callers taking this path own the
    /// freshness check ([`Entry::is_live`]) that [`ShardedCache::get`]
    /// performs for them.
    pub fn lookup(&self, key: &[u8]) -> Option<Arc<Entry>> {
        let fingerprint = self.fingerprint(key);
        self.shard(fingerprint).lookup(fingerprint)
    }

    /// Store a copy of `value` under `key`.
    ///
    /// `expire` above [`MAX_RELATIVE_EXPIRE`] is an absolute epoch deadline
    /// in seconds; anything smaller is a duration added to now. Fails only
    /// when the value copy cannot be allocated or described, leaving the
    /// cache unchanged.
    pub fn set(&self, key: &[u8], value: &[u8], expire: i64) -> CacheResult<()> {
        let now = self.clock.now();
        let deadline = if expire > MAX_RELATIVE_EXPIRE {
            expire
        } else {
            now + expire
        };
        let fingerprint = self.fingerprint(key);
        let entry = Entry::new(fingerprint, value, deadline, now)?;
        self.shard(fingerprint).replace(fingerprint, Arc::new(entry));
        Ok(())
    }

    /// Drop every entry.
    ///
    /// Entries are unindexed immediately (subsequent gets miss) and their
    /// memory is released by the following sweeps. Returns the number of
    /// entries that were indexed.
    pub fn flush(&self) -> u64 {
        self.shards.iter().map(Shard::clear).sum()
    }

    /// Run one reclaimer tick: read the clock once, skip while used memory
    /// sits below the configured floor, otherwise sweep every shard.
    ///
    /// Returns the number of entries reclaimed.
    pub fn purge_tick(&self) -> u64 {
        let now = self.clock.now();
        if self.used_memory_pct() < u64::from(self.config.purge_threshold_pct_min) {
            return 0;
        }
        self.shards.iter().map(|shard| shard.purge_some(now)).sum()
    }

    /// Number of indexed entries, counted by probing each shard.
    pub fn entry_count(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    /// Indexed entries per shard, for distribution diagnostics.
    pub fn shard_sizes(&self) -> [usize; SHARD_COUNT] {
        std::array::from_fn(|i| self.shards[i].len())
    }

    /// Estimated resident bytes across all shards, including entries
    /// awaiting reclamation.
    pub fn data_size_total(&self) -> u64 {
        self.shards.iter().map(Shard::data_size).sum()
    }

    /// Resident size as a percentage of the configured ceiling, clamped to
    /// 0-100.
    pub fn used_memory_pct(&self) -> u64 {
        let pct = self.data_size_total().saturating_mul(100) / self.config.max_memory_size.max(1);
        pct.min(100)
    }

    /// The cache's configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Emit the version banner on the diagnostic stream.
    pub fn print_version(&self) {
        eprintln!("{}", version_banner());
    }
}

/// One-line version banner.
pub fn version_banner() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Builder for [`ShardedCache`].
///
/// # Example
///
/// ```
/// use shardcache::ShardedCache;
/// use std::time::Duration;
///
/// let cache = ShardedCache::builder()
///     .max_memory_size(64 * 1024 * 1024)
///     .purge_loop_time(Duration::from_millis(250))
///     .build();
/// assert!(cache.get(b"missing").is_none());
/// ```
pub struct ShardedCacheBuilder<S: BuildHasher = RandomState> {
    config: CacheConfig,
    hasher: S,
    clock: Arc<dyn Clock>,
}

impl ShardedCacheBuilder<RandomState> {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            hasher: RandomState::new(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl Default for ShardedCacheBuilder<RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher> ShardedCacheBuilder<S> {
    /// Replace the whole configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the resident-memory ceiling in bytes.
    pub fn max_memory_size(mut self, bytes: u64) -> Self {
        self.config.max_memory_size = bytes;
        self
    }

    /// Set the reclaimer's sleep between ticks.
    pub fn purge_loop_time(mut self, interval: std::time::Duration) -> Self {
        self.config.purge_loop_time_us = interval.as_micros() as u64;
        self
    }

    /// Set the used-memory percentage below which ticks skip sweeping.
    pub fn purge_threshold_pct_min(mut self, pct: u8) -> Self {
        self.config.purge_threshold_pct_min = pct;
        self
    }

    /// Replace the fingerprint hasher.
    ///
    /// Any 64-bit `BuildHasher` works; fingerprint collisions are treated as
    /// key identity, so the hasher should be well distributed.
    pub fn hasher<S2: BuildHasher>(self, hasher: S2) -> ShardedCacheBuilder<S2> {
        ShardedCacheBuilder {
            config: self.config,
            hasher,
            clock: self.clock,
        }
    }

    /// Replace the time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the cache.
    pub fn build(self) -> ShardedCache<S> {
        ShardedCache {
            shards: std::array::from_fn(|_| Shard::new()),
            hasher: self.hasher,
            clock: self.clock,
            config: self.config,
        }
    }
}
