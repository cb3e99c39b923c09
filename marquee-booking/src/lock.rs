use marquee_core::repository::SeatCache;
use marquee_core::CacheResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Exclusive claim on one seat, backed by a set-if-absent cache key.
///
/// Release it with [`SeatLock::release`]. A guard dropped without release (the
/// owning task was cancelled) schedules the release on the current runtime; the
/// key TTL only covers a crashed process.
pub struct SeatLock {
    cache: Arc<dyn SeatCache>,
    key: String,
    token: String,
    released: bool,
}

impl SeatLock {
    /// `Ok(None)` when the key is already held.
    pub async fn try_acquire(
        cache: &Arc<dyn SeatCache>,
        key: String,
        token: String,
        ttl: Duration,
    ) -> CacheResult<Option<SeatLock>> {
        if !cache.set_if_absent(&key, &token, ttl).await? {
            return Ok(None);
        }
        debug!("Acquired lock {}", key);
        Ok(Some(SeatLock {
            cache: Arc::clone(cache),
            key,
            token,
            released: false,
        }))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn release(mut self) {
        // Cancelled during the delete: `released` is still false and `Drop` retries.
        let outcome = self.cache.delete_if_equals(&self.key, &self.token).await;
        self.released = true;
        match outcome {
            Ok(true) => debug!("Released lock {}", self.key),
            Ok(false) => warn!("Lock {} expired or changed hands before release", self.key),
            Err(e) => warn!("Failed to release lock {}, leaving it to its TTL: {}", self.key, e),
        }
    }
}

impl Drop for SeatLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let cache = Arc::clone(&self.cache);
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Lock {} dropped before release, releasing in background", key);
                handle.spawn(async move {
                    if let Err(e) = cache.delete_if_equals(&key, &token).await {
                        warn!("Background release of lock {} failed: {}", key, e);
                    }
                });
            }
            Err(_) => warn!("Lock {} dropped outside a runtime, leaving it to its TTL", key),
        }
    }
}
