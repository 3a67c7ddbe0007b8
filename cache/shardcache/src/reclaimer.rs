//! Background reclaimer task.

use crate::cache::ShardedCache;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

/// Handle to the thread that periodically sweeps expired entries.
///
/// The thread wakes every `purge_loop_time`, and each tick either skips
/// (used memory below the configured floor) or sweeps every shard. The
/// shutdown signal is observed between ticks, so stopping waits at most one
/// sleep interval plus an in-flight sweep.
///
/// # Example
///
/// ```ignore
/// let cache = Arc::new(ShardedCache::new());
/// let reclaimer = Reclaimer::spawn(cache.clone());
/// // ... serve traffic ...
/// reclaimer.stop();
/// ```
pub struct Reclaimer {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Reclaimer {
    /// Spawn the reclaimer thread for `cache`.
    pub fn spawn<S>(cache: Arc<ShardedCache<S>>) -> Self
    where
        S: BuildHasher + Send + Sync + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let handle = std::thread::Builder::new()
            .name("cache-reclaimer".to_string())
            .spawn(move || run(cache, flag))
            .expect("failed to spawn reclaimer thread");
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Reclaimer {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

fn run<S>(cache: Arc<ShardedCache<S>>, shutdown: Arc<AtomicBool>)
where
    S: BuildHasher + Send + Sync + 'static,
{
    let interval = cache.config().purge_loop_time();
    tracing::debug!(?interval, "reclaimer started");
    while !shutdown.load(Ordering::Relaxed) {
        std::thread::sleep(interval);
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        let removed = cache.purge_tick();
        if removed > 0 {
            tracing::debug!(removed, "reclaimed expired entries");
        }
    }
    tracing::debug!("reclaimer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::{Duration, Instant};

    const EPOCH: i64 = 1_700_000_000;

    #[test]
    fn test_background_sweep_empties_expired_cache() {
        let clock = Arc::new(ManualClock::new(EPOCH));
        let cache = Arc::new(
            ShardedCache::builder()
                .clock(clock.clone())
                .max_memory_size(1024)
                .purge_loop_time(Duration::from_millis(5))
                .build(),
        );
        for i in 0..50u32 {
            let key = format!("key_{}", i);
            cache.set(key.as_bytes(), &[0xCD; 64], EPOCH - 1).unwrap();
        }
        assert_eq!(cache.entry_count(), 50);

        let reclaimer = Reclaimer::spawn(cache.clone());
        let deadline = Instant::now() + Duration::from_secs(5);
        while cache.entry_count() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        reclaimer.stop();
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn test_sweep_skipped_below_pressure_floor() {
        let clock = Arc::new(ManualClock::new(EPOCH));
        let cache = Arc::new(
            ShardedCache::builder()
                .clock(clock.clone())
                .purge_loop_time(Duration::from_millis(5))
                .build(),
        );
        for i in 0..10u32 {
            let key = format!("key_{}", i);
            cache.set(key.as_bytes(), b"v", EPOCH - 1).unwrap();
        }

        let reclaimer = Reclaimer::spawn(cache.clone());
        std::thread::sleep(Duration::from_millis(50));
        reclaimer.stop();
        // A few stale entries under a 4 MiB ceiling never reach the floor.
        assert_eq!(cache.entry_count(), 10);
    }

    #[test]
    fn test_drop_stops_the_thread() {
        let cache = Arc::new(
            ShardedCache::builder()
                .purge_loop_time(Duration::from_millis(5))
                .build(),
        );
        let reclaimer = Reclaimer::spawn(cache.clone());
        drop(reclaimer);
        // Only the cache's own reference remains once the thread exits.
        assert_eq!(Arc::strong_count(&cache), 1);
    }
}
