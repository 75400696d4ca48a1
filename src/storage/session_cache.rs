// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cache holding profile snapshots and refresh tokens.
//!
//! A profile snapshot's presence is what makes a session live: the session
//! gate rejects a valid access token whose snapshot has expired or been
//! evicted. Each key is independent and last write wins.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;
use crate::clock::Clock;

/// Cache key for a user's profile snapshot.
pub fn profile_key(user_id: Uuid) -> String {
    format!("profile_{user_id}")
}

/// Cache key for a user's current refresh token.
pub fn refresh_token_key(user_id: Uuid) -> String {
    format!("refresh_token_{user_id}")
}

/// Denormalized copy of the account fields needed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileSnapshot {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("session cache lock poisoned")]
    Poisoned,

    #[error("cached value is unreadable: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value contract the auth workflow and session gate rely on.
pub trait SessionCache: Send + Sync {
    fn set_profile(
        &self,
        key: &str,
        profile: &ProfileSnapshot,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    fn get_profile(&self, key: &str) -> Result<Option<ProfileSnapshot>, CacheError>;

    fn set_refresh_token(&self, key: &str, token: &str, ttl: Duration) -> Result<(), CacheError>;

    fn get_refresh_token(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Evict a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Cached value + absolute expiry.
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-process LRU session cache with per-entry TTL.
///
/// Values are kept as JSON strings, the same shape an external KV store
/// would hold, so swapping the backend does not change what is cached.
pub struct LruSessionCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl LruSessionCache {
    /// Create a cache holding at most `capacity` keys.
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            clock,
        }
    }

    fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut cache = self.cache.lock().map_err(|_| CacheError::Poisoned)?;
        cache.put(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.now();
        let mut cache = self.cache.lock().map_err(|_| CacheError::Poisoned)?;
        if let Some(entry) = cache.get(key) {
            if now < entry.expires_at {
                return Ok(Some(entry.value.clone()));
            }
            // Expired, drop it
            cache.pop(key);
        }
        Ok(None)
    }
}

impl SessionCache for LruSessionCache {
    fn set_profile(
        &self,
        key: &str,
        profile: &ProfileSnapshot,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.put(key, serde_json::to_string(profile)?, ttl)
    }

    fn get_profile(&self, key: &str) -> Result<Option<ProfileSnapshot>, CacheError> {
        match self.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set_refresh_token(&self, key: &str, token: &str, ttl: Duration) -> Result<(), CacheError> {
        self.put(key, token.to_string(), ttl)
    }

    fn get_refresh_token(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.get(key)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut cache = self.cache.lock().map_err(|_| CacheError::Poisoned)?;
        cache.pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache() -> (LruSessionCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (LruSessionCache::new(16, clock.clone()), clock)
    }

    fn snapshot() -> ProfileSnapshot {
        ProfileSnapshot {
            user_id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            full_name: "A".to_string(),
            role: Role::Customer,
            is_active: true,
        }
    }

    #[test]
    fn keys_are_prefixed_by_kind() {
        let id = Uuid::nil();
        assert_eq!(
            profile_key(id),
            "profile_00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            refresh_token_key(id),
            "refresh_token_00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn profile_put_and_get() {
        let (cache, _) = cache();
        let profile = snapshot();
        let key = profile_key(profile.user_id);

        assert!(cache.get_profile(&key).unwrap().is_none());
        cache
            .set_profile(&key, &profile, Duration::minutes(15))
            .unwrap();
        assert_eq!(cache.get_profile(&key).unwrap(), Some(profile));
    }

    #[test]
    fn entries_expire_with_ttl() {
        let (cache, clock) = cache();
        cache
            .set_refresh_token("refresh_token_x", "tok", Duration::seconds(30))
            .unwrap();

        clock.advance(Duration::seconds(29));
        assert_eq!(
            cache.get_refresh_token("refresh_token_x").unwrap().as_deref(),
            Some("tok")
        );

        clock.advance(Duration::seconds(1));
        assert!(cache.get_refresh_token("refresh_token_x").unwrap().is_none());
    }

    #[test]
    fn last_write_wins() {
        let (cache, _) = cache();
        cache
            .set_refresh_token("k", "first", Duration::hours(1))
            .unwrap();
        cache
            .set_refresh_token("k", "second", Duration::hours(1))
            .unwrap();
        assert_eq!(
            cache.get_refresh_token("k").unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn remove_evicts_entry() {
        let (cache, _) = cache();
        let profile = snapshot();
        let key = profile_key(profile.user_id);
        cache.set_profile(&key, &profile, Duration::hours(1)).unwrap();

        cache.remove(&key).unwrap();
        assert!(cache.get_profile(&key).unwrap().is_none());
        // Removing again is fine
        cache.remove(&key).unwrap();
    }

    #[test]
    fn capacity_bounds_entries() {
        let clock = Arc::new(ManualClock::default());
        let cache = LruSessionCache::new(2, clock);
        for key in ["a", "b", "c"] {
            cache.set_refresh_token(key, key, Duration::hours(1)).unwrap();
        }
        assert!(cache.get_refresh_token("a").unwrap().is_none());
        assert!(cache.get_refresh_token("c").unwrap().is_some());
    }

    #[test]
    fn unreadable_profile_is_an_error() {
        let (cache, _) = cache();
        cache
            .set_refresh_token("profile_bad", "not json", Duration::hours(1))
            .unwrap();
        assert!(matches!(
            cache.get_profile("profile_bad"),
            Err(CacheError::Serde(_))
        ));
    }
}
