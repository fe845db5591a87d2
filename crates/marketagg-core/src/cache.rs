//! In-memory TTL cache for normalised market data.
//!
//! Entries hold typed values behind `Arc<dyn Any>` so one store can serve
//! tickers, candle series and order books. A read that finds the entry under
//! a different type is reported as a miss. Expired entries are dropped
//! lazily when read, by [`CacheStore::purge_expired`], or by a background
//! sweeper started with [`CacheStore::spawn_sweeper`].
//!
//! Time is taken from `tokio::time::Instant`, so a paused test runtime
//! controls expiry.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::ValidationError;

/// Longest time to live [`CachePolicy::validate`] accepts.
pub const MAX_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key such as `ticker:BTCUSDT` or `klines:BTCUSDT:1h:100`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

/// Thread-safe keyed store with a per-entry time to live.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone, Default)]
pub struct CacheStore {
    inner: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.len())
            .finish()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the live value stored under `key`.
    ///
    /// Returns `None` when no entry exists, the entry has expired, or the
    /// entry holds a value of another type.
    pub fn get<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Any + Clone + Send + Sync,
    {
        let now = Instant::now();
        {
            let map = self.inner.read();
            let entry = map.get(key)?;
            if entry.is_live(now) {
                let value = entry.value.downcast_ref::<T>().cloned();
                if value.is_none() {
                    tracing::debug!(key = %key, "cached value has a different type, treating as miss");
                }
                return value;
            }
        }

        let mut map = self.inner.write();
        // Another writer may have refreshed the key between the locks.
        if map.get(key).is_some_and(|entry| !entry.is_live(now)) {
            map.remove(key);
        }
        None
    }

    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    ///
    /// A zero `ttl`, or one too large to represent as a deadline, stores
    /// nothing.
    pub fn set<T>(&self, key: CacheKey, value: T, ttl: Duration)
    where
        T: Any + Send + Sync,
    {
        if ttl.is_zero() {
            return;
        }
        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            tracing::warn!(key = %key, ?ttl, "cache ttl overflows the clock, not storing");
            return;
        };

        let entry = CacheEntry {
            value: Arc::new(value),
            expires_at,
        };
        self.inner.write().insert(key, entry);
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut map = self.inner.write();
        let before = map.len();
        map.retain(|_, entry| entry.is_live(now));
        before - map.len()
    }

    /// Spawns a task that calls [`Self::purge_expired`] every `period`.
    ///
    /// Must be called from within a Tokio runtime. Abort the returned handle
    /// to stop sweeping.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = store.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "swept expired cache entries");
                }
            }
        })
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

/// Time to live for each kind of cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Ticker assembled from the primary provider.
    pub ticker: Duration,
    /// Degraded ticker assembled from the secondary provider.
    pub ticker_fallback: Duration,
    pub klines: Duration,
    pub depth: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ticker: Duration::from_secs(30),
            ticker_fallback: Duration::from_secs(10),
            klines: Duration::from_secs(60),
            depth: Duration::from_secs(5),
        }
    }
}

impl CachePolicy {
    /// Checks that every TTL is positive and at most [`MAX_TTL`], that depth
    /// expires before tickers and tickers before klines, and that a degraded
    /// ticker expires before a full one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let named = [
            ("ticker", self.ticker),
            ("ticker_fallback", self.ticker_fallback),
            ("klines", self.klines),
            ("depth", self.depth),
        ];
        if let Some(&(name, _)) = named.iter().find(|(_, ttl)| ttl.is_zero()) {
            return Err(ValidationError::ZeroTtl { name });
        }
        if let Some(&(name, ttl)) = named.iter().find(|(_, ttl)| *ttl > MAX_TTL) {
            return Err(ValidationError::TtlTooLong {
                name,
                secs: ttl.as_secs(),
                max_secs: MAX_TTL.as_secs(),
            });
        }

        if self.depth >= self.ticker {
            return Err(ValidationError::TtlOrdering {
                reason: "depth must expire before ticker",
            });
        }
        if self.ticker >= self.klines {
            return Err(ValidationError::TtlOrdering {
                reason: "ticker must expire before klines",
            });
        }
        if self.ticker_fallback >= self.ticker {
            return Err(ValidationError::TtlOrdering {
                reason: "ticker_fallback must expire before ticker",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> CacheKey {
        CacheKey::new(value)
    }

    #[tokio::test(start_paused = true)]
    async fn set_then_get_returns_value_until_expiry() {
        let cache = CacheStore::new();
        cache.set(key("a"), String::from("value"), Duration::from_secs(2));

        assert_eq!(cache.get::<String>(&key("a")).as_deref(), Some("value"));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(cache.get::<String>(&key("a")), None);
        assert_eq!(cache.len(), 0, "expired entry is dropped on read");
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_resets_the_ttl() {
        let cache = CacheStore::new();
        cache.set(key("a"), 1_u32, Duration::from_secs(2));
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.set(key("a"), 2_u32, Duration::from_secs(2));
        tokio::time::advance(Duration::from_millis(1_500)).await;

        assert_eq!(cache.get::<u32>(&key("a")), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_expired_counts_removed_entries() {
        let cache = CacheStore::new();
        cache.set(key("short"), 1_u8, Duration::from_secs(1));
        cache.set(key("long"), 2_u8, Duration::from_secs(60));
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_purges_in_the_background() {
        let cache = CacheStore::new();
        cache.set(key("a"), 1_u8, Duration::from_secs(1));
        let handle = cache.spawn_sweeper(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(cache.is_empty());
        handle.abort();
    }

    #[test]
    fn zero_ttl_stores_nothing() {
        let cache = CacheStore::new();
        cache.set(key("a"), 1_u8, Duration::ZERO);
        assert!(cache.is_empty());
    }

    #[test]
    fn ttl_past_the_clock_range_stores_nothing() {
        let cache = CacheStore::new();
        cache.set(key("a"), 1_u8, Duration::from_secs(u64::MAX));
        assert!(cache.is_empty());
    }

    #[test]
    fn policy_rejects_ttls_above_the_maximum() {
        let endless = CachePolicy {
            klines: Duration::from_secs(u64::MAX),
            ..CachePolicy::default()
        };
        assert_eq!(
            endless.validate(),
            Err(ValidationError::TtlTooLong {
                name: "klines",
                secs: u64::MAX,
                max_secs: MAX_TTL.as_secs(),
            })
        );

        let one_day = CachePolicy {
            klines: MAX_TTL,
            ..CachePolicy::default()
        };
        assert_eq!(one_day.validate(), Ok(()));
    }

    #[test]
    fn default_policy_is_valid() {
        assert_eq!(CachePolicy::default().validate(), Ok(()));
    }

    #[test]
    fn policy_rejects_zero_and_misordered_ttls() {
        let zero = CachePolicy {
            depth: Duration::ZERO,
            ..CachePolicy::default()
        };
        assert_eq!(
            zero.validate(),
            Err(ValidationError::ZeroTtl { name: "depth" })
        );

        let slow_depth = CachePolicy {
            depth: Duration::from_secs(30),
            ..CachePolicy::default()
        };
        assert!(matches!(
            slow_depth.validate(),
            Err(ValidationError::TtlOrdering { .. })
        ));

        let slow_fallback = CachePolicy {
            ticker_fallback: Duration::from_secs(45),
            ..CachePolicy::default()
        };
        assert!(slow_fallback.validate().is_err());
    }
}
