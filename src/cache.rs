//! Time-boxed cache of the merged user collection.
//!
//! The collection is stored under [`CACHE_KEY`] as a plain JSON array of
//! users, with its epoch-millisecond stamp under [`CACHE_TIMESTAMP_KEY`] and
//! the strategy that produced it under [`CACHE_STRATEGY_KEY`]. Writes drop the
//! stamp first and put it back last, so an interrupted write leaves the
//! payload without a stamp and the entry reads as [`CacheLookup::Torn`].
//!
//! An entry is fresh while `now - saved_at < ttl_ms`. There is no background
//! eviction; expiry is only checked at read time.

use log::{debug, info, warn};

use crate::config::{CACHE_KEY, CACHE_STRATEGY_KEY, CACHE_TIMESTAMP_KEY, CACHE_TTL_MS};
use crate::error::StorageError;
use crate::model::{Strategy, User};
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub saved_at: u64,
    /// `None` when the entry was written without a strategy label.
    pub strategy: Option<Strategy>,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Fresh(CacheEntry),
    Expired { age_ms: u64 },
    Missing,
    /// Payload without a readable stamp, or a payload that does not parse.
    Torn,
}

pub struct UserCache<K> {
    store: K,
    ttl_ms: u64,
}

impl<K: KeyValueStore> UserCache<K> {
    pub fn new(store: K) -> Self {
        Self::with_ttl(store, CACHE_TTL_MS)
    }

    pub fn with_ttl(store: K, ttl_ms: u64) -> Self {
        Self { store, ttl_ms }
    }

    fn saved_at(&self) -> Option<u64> {
        self.store
            .get(CACHE_TIMESTAMP_KEY)
            .and_then(|s| s.trim().parse::<u64>().ok())
    }

    pub fn lookup(&self, now_ms: u64) -> CacheLookup {
        let Some(payload) = self.store.get(CACHE_KEY) else {
            return CacheLookup::Missing;
        };
        let Some(saved_at) = self.saved_at() else {
            warn!("Cached users have no readable timestamp");
            return CacheLookup::Torn;
        };
        let users: Vec<User> = match serde_json::from_str(&payload) {
            Ok(users) => users,
            Err(e) => {
                warn!("Cached payload does not parse: {}", e);
                return CacheLookup::Torn;
            }
        };

        // A stamp from the future means the clock moved; do not trust it.
        if saved_at > now_ms {
            return CacheLookup::Expired { age_ms: 0 };
        }
        let age_ms = now_ms - saved_at;
        if age_ms < self.ttl_ms {
            debug!("Cache hit, {} users, {} ms old", users.len(), age_ms);
            let strategy = self
                .store
                .get(CACHE_STRATEGY_KEY)
                .and_then(|label| Strategy::from_label(&label));
            CacheLookup::Fresh(CacheEntry {
                saved_at,
                strategy,
                users,
            })
        } else {
            CacheLookup::Expired { age_ms }
        }
    }

    /// Write `users` stamped with `now_ms`. Returns `Ok(false)` without
    /// touching storage when the current entry carries a later stamp.
    pub fn store(
        &self,
        users: &[User],
        strategy: Strategy,
        now_ms: u64,
    ) -> Result<bool, StorageError> {
        if let Some(existing) = self.saved_at() {
            if existing > now_ms {
                info!(
                    "Keeping newer cache entry ({} > {})",
                    existing, now_ms
                );
                return Ok(false);
            }
        }
        let payload =
            serde_json::to_string(users).map_err(|e| StorageError::Encode(e.to_string()))?;

        self.store.remove(CACHE_TIMESTAMP_KEY);
        self.store.set(CACHE_KEY, &payload)?;
        self.store.set(CACHE_STRATEGY_KEY, &strategy.to_string())?;
        self.store.set(CACHE_TIMESTAMP_KEY, &now_ms.to_string())?;
        Ok(true)
    }

    pub fn invalidate(&self) {
        self.store.remove(CACHE_KEY);
        self.store.remove(CACHE_TIMESTAMP_KEY);
        self.store.remove(CACHE_STRATEGY_KEY);
    }
}
