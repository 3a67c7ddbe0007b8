//! Cache shards: fingerprint index plus reclaimer scan sequence.

use crate::entry::{ENTRY_OVERHEAD, Entry};
use crate::metrics;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One of the cache's independent indexes.
///
/// The map serves point lookups by fingerprint; the sequence preserves
/// insertion order for the reclaimer's linear sweep and supports O(1)
/// removal by swapping with the last element. Both live behind a single
/// readers-writer lock, together with the shard's resident-byte tally.
///
/// A superseded or flushed entry leaves the map immediately but stays in the
/// sequence, marked dropped, until a sweep reclaims it. Outstanding read
/// borrows (`Arc` clones handed out by [`Shard::lookup`]) keep the entry's
/// bytes alive past unindexing.
pub struct Shard {
    index: RwLock<ShardIndex>,
}

#[derive(Default)]
struct ShardIndex {
    map: BTreeMap<u64, Arc<Entry>>,
    seq: Vec<Arc<Entry>>,
    value_bytes: u64,
}

impl Shard {
    pub(crate) fn new() -> Self {
        Self {
            index: RwLock::new(ShardIndex::default()),
        }
    }

    /// Insert `entry` under `fingerprint`, displacing any previous holder.
    ///
    /// The displaced entry is marked dropped and loses its map slot; the
    /// next sweep reclaims it from the sequence.
    pub fn replace(&self, fingerprint: u64, entry: Arc<Entry>) {
        let len = u64::from(entry.len());
        let mut index = self.index.write();
        metrics::SETS.increment();
        metrics::VALUE_BYTES.add(len);
        metrics::BYTES_IN.add(len);
        metrics::ENTRIES.increment();
        index.value_bytes += len;
        index.seq.push(entry.clone());
        if let Some(displaced) = index.map.insert(fingerprint, entry) {
            displaced.mark_dropped();
        }
    }

    /// Take a read borrow of the entry indexed under `fingerprint`.
    ///
    /// The borrow is an `Arc` clone; dropping it releases the entry without
    /// touching the lock. Freshness is the caller's concern: the hit
    /// counters track index hits, so an entry that turns out to be expired
    /// still counts as one.
    pub fn lookup(&self, fingerprint: u64) -> Option<Arc<Entry>> {
        let index = self.index.read();
        metrics::GETS.increment();
        let entry = index.map.get(&fingerprint)?;
        metrics::GET_HITS.increment();
        metrics::BYTES_OUT.add(u64::from(entry.len()));
        Some(entry.clone())
    }

    /// Sweep dropped and expired entries.
    ///
    /// A shared-lock scan first estimates the reclaimable footprint; when
    /// that is at most 1% of the shard's resident size the sweep stops
    /// without taking the write lock. `now` is the reclaimer's per-tick
    /// timestamp. Returns the number of entries removed.
    pub fn purge_some(&self, now: i64) -> u64 {
        let (evictable, evictable_bytes, data_size) = {
            let index = self.index.read();
            let mut count = 0u64;
            let mut bytes = 0u64;
            for entry in &index.seq {
                if entry.is_purgeable(now) {
                    count += 1;
                    bytes += u64::from(entry.len());
                }
            }
            let data_size = index.seq.len() as u64 * ENTRY_OVERHEAD + index.value_bytes;
            (count, bytes, data_size)
        };
        if evictable_bytes + evictable * ENTRY_OVERHEAD <= data_size / 100 {
            return 0;
        }

        let mut removed = 0u64;
        let mut freed = 0u64;
        {
            let mut index = self.index.write();
            let mut i = 0;
            while i < index.seq.len() {
                if !index.seq[i].is_purgeable(now) {
                    i += 1;
                    continue;
                }
                let entry = index.seq.swap_remove(i);
                // The map slot may already belong to a successor under the
                // same fingerprint; only an identical entry is unindexed.
                if index
                    .map
                    .get(&entry.key())
                    .is_some_and(|held| Arc::ptr_eq(held, &entry))
                {
                    index.map.remove(&entry.key());
                }
                freed += u64::from(entry.len());
                removed += 1;
            }
            index.value_bytes -= freed;
        }
        if removed > 0 {
            metrics::ENTRIES.sub(removed);
            metrics::VALUE_BYTES.sub(freed);
            metrics::FREED_BYTES.add(freed);
            metrics::PURGED.add(removed);
        }
        removed
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.index.read().map.len()
    }

    /// Whether no entries are indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark every indexed entry dropped and clear the map.
    ///
    /// The sequence keeps its references so outstanding read borrows stay
    /// valid; the next sweep releases the memory. Returns the number of
    /// entries that were indexed.
    pub fn clear(&self) -> u64 {
        let mut index = self.index.write();
        let count = index.map.len() as u64;
        for entry in index.map.values() {
            entry.mark_dropped();
        }
        index.map.clear();
        count
    }

    /// Estimated resident bytes: per-entry bookkeeping plus value payloads,
    /// including superseded entries not yet swept.
    pub fn data_size(&self) -> u64 {
        let index = self.index.read();
        index.seq.len() as u64 * ENTRY_OVERHEAD + index.value_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: u64, value: &[u8], expire: i64) -> Arc<Entry> {
        Arc::new(Entry::new(key, value, expire, 0).unwrap())
    }

    #[test]
    fn test_replace_and_lookup() {
        let shard = Shard::new();
        shard.replace(1, entry(1, b"hello", 100));
        let found = shard.lookup(1).unwrap();
        assert_eq!(found.value(), b"hello");
        assert_eq!(shard.len(), 1);
    }

    #[test]
    fn test_lookup_miss() {
        let shard = Shard::new();
        assert!(shard.lookup(42).is_none());
    }

    #[test]
    fn test_replace_displaces_previous() {
        let shard = Shard::new();
        shard.replace(1, entry(1, b"a", 100));
        shard.replace(1, entry(1, b"bb", 100));
        assert_eq!(shard.lookup(1).unwrap().value(), b"bb");
        // One indexed entry, but the displaced one still occupies the
        // sequence until a sweep runs.
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.data_size(), 2 * ENTRY_OVERHEAD + 3);
    }

    #[test]
    fn test_purge_reclaims_superseded_without_touching_successor() {
        let shard = Shard::new();
        shard.replace(1, entry(1, b"a", 100));
        shard.replace(1, entry(1, b"bb", 100));
        let removed = shard.purge_some(50);
        assert_eq!(removed, 1);
        assert_eq!(shard.lookup(1).unwrap().value(), b"bb");
        assert_eq!(shard.data_size(), ENTRY_OVERHEAD + 2);
    }

    #[test]
    fn test_purge_removes_expired() {
        let shard = Shard::new();
        shard.replace(1, entry(1, b"old", 10));
        shard.replace(2, entry(2, b"new", 100));
        let removed = shard.purge_some(50);
        assert_eq!(removed, 1);
        assert!(shard.lookup(1).is_none());
        assert!(shard.lookup(2).is_some());
        assert_eq!(shard.len(), 1);
    }

    #[test]
    fn test_purge_boundary_is_strict() {
        let shard = Shard::new();
        shard.replace(1, entry(1, b"v", 50));
        // Unreadable at its deadline but swept only after it.
        assert_eq!(shard.purge_some(50), 0);
        assert_eq!(shard.purge_some(51), 1);
    }

    #[test]
    fn test_purge_skips_tiny_yield() {
        let shard = Shard::new();
        // One small stale entry buried under plenty of live data is not
        // worth the write lock.
        shard.replace(1, entry(1, b"stale", 10));
        for key in 2..100u64 {
            shard.replace(key, entry(key, &[0u8; 1024], 1_000));
        }
        let removed = shard.purge_some(50);
        assert_eq!(removed, 0);
        assert_eq!(shard.len(), 99);
    }

    #[test]
    fn test_clear_marks_dropped_and_unindexes() {
        let shard = Shard::new();
        shard.replace(1, entry(1, b"a", 100));
        shard.replace(2, entry(2, b"b", 100));
        assert_eq!(shard.clear(), 2);
        assert!(shard.lookup(1).is_none());
        assert!(shard.is_empty());
        // Memory is still resident until a sweep runs.
        assert_eq!(shard.data_size(), 2 * ENTRY_OVERHEAD + 2);
        assert_eq!(shard.purge_some(0), 2);
        assert_eq!(shard.data_size(), 0);
    }

    #[test]
    fn test_reader_borrow_survives_sweep() {
        let shard = Shard::new();
        shard.replace(1, entry(1, b"held", 100));
        let borrow = shard.lookup(1).unwrap();
        shard.replace(1, entry(1, b"next", 100));
        let removed = shard.purge_some(50);
        assert_eq!(removed, 1);
        // The borrow still resolves to the superseded bytes.
        assert_eq!(borrow.value(), b"held");
        assert_eq!(shard.lookup(1).unwrap().value(), b"next");
    }
}
