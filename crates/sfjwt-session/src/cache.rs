//! LRU-bounded session store with idle expiry.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::ttl::TtlTracker;

struct CacheInner<V> {
    lru: LruCache<Uuid, V>,
    ttl: TtlTracker,
}

impl<V> CacheInner<V> {
    /// Drop the entry if it has expired. Returns true when it was dropped.
    fn evict_if_expired(&mut self, id: &Uuid) -> bool {
        if self.lru.contains(id) && self.ttl.is_expired(id) {
            self.lru.pop(id);
            self.ttl.remove(id);
            debug!(session_id = %id, "Session expired, removed from store");
            true
        } else {
            false
        }
    }
}

/// In-memory session store keyed by UUID.
///
/// Writes are last-write-wins. Cloning is cheap and shares the same store.
pub struct SessionCache<V> {
    inner: Arc<RwLock<CacheInner<V>>>,
    config: CacheConfig,
}

impl<V: Clone + Send + Sync + 'static> SessionCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);
        let inner = CacheInner {
            lru: LruCache::new(cap),
            ttl: TtlTracker::new(config.ttl),
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    /// Store a value under a fresh random id.
    pub async fn create(&self, value: V) -> Uuid {
        let id = Uuid::new_v4();
        self.insert(id, value).await;
        id
    }

    /// Store a value, evicting the least recently used session when full.
    pub async fn insert(&self, id: Uuid, value: V) {
        let mut inner = self.inner.write().await;

        if let Some((evicted, _)) = inner.lru.push(id, value)
            && evicted != id
        {
            inner.ttl.remove(&evicted);
            debug!(session_id = %evicted, "Evicted least recently used session");
        }
        inner.ttl.touch(id);

        trace!(session_id = %id, store_size = inner.lru.len(), "Session stored");
    }

    /// Fetch a copy of a session, refreshing its LRU position and idle timer.
    pub async fn get(&self, id: &Uuid) -> Result<V> {
        let mut inner = self.inner.write().await;

        if inner.evict_if_expired(id) {
            return Err(Error::Expired(id.to_string()));
        }
        let value = inner
            .lru
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        inner.ttl.touch(*id);
        Ok(value)
    }

    /// Read a session without refreshing it.
    pub async fn peek(&self, id: &Uuid) -> Option<V> {
        let inner = self.inner.read().await;
        if inner.ttl.is_expired(id) {
            None
        } else {
            inner.lru.peek(id).cloned()
        }
    }

    /// Mutate a session in place. Refreshes its LRU position and idle timer.
    pub async fn with_mut<F, R>(&self, id: &Uuid, f: F) -> Result<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut inner = self.inner.write().await;

        if inner.evict_if_expired(id) {
            return Err(Error::Expired(id.to_string()));
        }
        let result = match inner.lru.get_mut(id) {
            Some(value) => f(value),
            None => return Err(Error::NotFound(id.to_string())),
        };
        inner.ttl.touch(*id);
        Ok(result)
    }

    /// Drop a session. Returns the value if it was live.
    pub async fn remove(&self, id: &Uuid) -> Option<V> {
        let mut inner = self.inner.write().await;
        let expired = inner.ttl.is_expired(id);
        inner.ttl.remove(id);
        let value = inner.lru.pop(id);
        if expired { None } else { value }
    }

    pub async fn contains(&self, id: &Uuid) -> bool {
        let inner = self.inner.read().await;
        inner.lru.contains(id) && !inner.ttl.is_expired(id)
    }

    /// Remove every expired session and return how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let expired = inner.ttl.drain_expired();
        let mut count = 0;
        for id in expired {
            if inner.lru.pop(&id).is_some() {
                count += 1;
            }
        }
        if count > 0 {
            debug!(count, "Cleaned up expired sessions");
        }
        count
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            size: inner.lru.len(),
            capacity: inner.lru.cap().get(),
            ttl_secs: inner.ttl.ttl().map(|d| d.as_secs()),
        }
    }

    /// Start a background sweep of expired sessions.
    ///
    /// Returns `None` when no TTL is configured. Must be called inside a
    /// Tokio runtime.
    pub fn spawn_cleanup_task(&self) -> Option<JoinHandle<()>> {
        self.config.ttl?;
        let cache = self.clone();
        let period = self.config.cleanup_interval;
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                cache.cleanup_expired().await;
            }
        }))
    }
}

impl<V> Clone for SessionCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheStats {
    /// Live session count, including expired ones not yet swept.
    pub size: usize,
    /// Maximum live sessions; a configured 0 is clamped to 1.
    pub capacity: usize,
    pub ttl_secs: Option<u64>,
}
