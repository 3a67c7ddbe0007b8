//! C ABI factory for hosting the cache as a dynamically loaded plugin.
//!
//! The host resolves two symbols: [`create_cache`] builds a cache with the
//! default configuration and starts its reclaimer; [`destroy_cache`] stops
//! the reclaimer and releases the cache. The returned pointer is opaque to
//! the host.

use crate::cache::ShardedCache;
use crate::reclaimer::Reclaimer;
use std::sync::Arc;

/// Opaque handle owning a cache and its running reclaimer.
pub struct CacheHandle {
    cache: Arc<ShardedCache>,
    reclaimer: Reclaimer,
}

impl CacheHandle {
    /// The cache owned by this handle.
    pub fn cache(&self) -> &Arc<ShardedCache> {
        &self.cache
    }
}

/// Build a cache with the default configuration and a running reclaimer.
///
/// The returned pointer must be released with [`destroy_cache`].
#[unsafe(no_mangle)]
pub extern "C" fn create_cache() -> *mut CacheHandle {
    let cache = Arc::new(ShardedCache::new());
    let reclaimer = Reclaimer::spawn(cache.clone());
    Box::into_raw(Box::new(CacheHandle { cache, reclaimer }))
}

/// Stop the reclaimer and release a cache built by [`create_cache`].
///
/// Null is a no-op.
///
/// # Safety
///
/// `handle` must be null or a pointer returned by [`create_cache`] that has
/// not already been destroyed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn destroy_cache(handle: *mut CacheHandle) {
    if handle.is_null() {
        return;
    }
    let CacheHandle { cache, reclaimer } = *unsafe { Box::from_raw(handle) };
    reclaimer.stop();
    drop(cache);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_round_trip() {
        let handle = create_cache();
        assert!(!handle.is_null());
        {
            let cache = unsafe { (*handle).cache() };
            cache.set(b"k", b"v", 60).unwrap();
            assert_eq!(cache.get(b"k").as_deref(), Some(&b"v"[..]));
        }
        unsafe { destroy_cache(handle) };
    }

    #[test]
    fn test_destroy_null_is_noop() {
        unsafe { destroy_cache(std::ptr::null_mut()) };
    }
}
