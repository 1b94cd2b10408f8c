use std::collections::HashMap;
#[cfg(feature = "ssr")]
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(feature = "ssr")]
use tracing::{info, warn};

use crate::model::UserId;

pub const LEADERBOARD_CACHE_KEY: &str = "leaderboard:latest";

pub fn predictions_cache_key(user_id: UserId) -> String {
    format!("predictions:{}", user_id)
}

/// A string key/value store with per-entry expiry. Values are serialized JSON.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String, ttl: Duration);
    fn del(&self, key: &str);
}

/// Process-local cache. Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries();
        let (value, expired) = match entries.get(key) {
            Some((value, expires_at)) => (value.clone(), Instant::now() >= *expires_at),
            None => return None,
        };
        if expired {
            entries.remove(key);
            return None;
        }
        Some(value)
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        self.entries()
            .insert(key.to_string(), (value, Instant::now() + ttl));
    }

    fn del(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// Redis-backed cache. Holds one connection, opened lazily and dropped after any error so the next
/// call reconnects. Redis errors are logged and read as a miss.
#[cfg(feature = "ssr")]
pub struct RedisCache {
    client: redis::Client,
    timeout: Duration,
    conn: Mutex<Option<redis::Connection>>,
}

#[cfg(feature = "ssr")]
impl RedisCache {
    /// Parses `url` without connecting.
    pub fn open(url: &str, timeout: Duration) -> redis::RedisResult<Self> {
        Ok(Self {
            client: redis::Client::open(url)?,
            timeout,
            conn: Mutex::new(None),
        })
    }

    fn connect(&self) -> redis::RedisResult<redis::Connection> {
        let conn = self.client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        Ok(conn)
    }

    fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> redis::RedisResult<T> {
        let mut slot = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };
        let result = cmd.query(&mut conn);
        if result.is_ok() {
            *slot = Some(conn);
        }
        result
    }

    pub fn ping(&self) -> redis::RedisResult<()> {
        self.query::<String>(&redis::cmd("PING")).map(|_| ())
    }
}

#[cfg(feature = "ssr")]
impl Cache for RedisCache {
    fn get(&self, key: &str) -> Option<String> {
        self.query(redis::cmd("GET").arg(key)).unwrap_or_else(|e| {
            warn!("Redis GET {key} failed: {e}");
            None
        })
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        // PX takes milliseconds and rejects 0.
        let millis = ttl.as_millis().max(1) as u64;
        let cmd = redis::cmd("SET").arg(key).arg(value).arg("PX").arg(millis).clone();
        if let Err(e) = self.query::<()>(&cmd) {
            warn!("Redis SET {key} failed: {e}");
        }
    }

    fn del(&self, key: &str) {
        if let Err(e) = self.query::<()>(redis::cmd("DEL").arg(key)) {
            warn!("Redis DEL {key} failed: {e}");
        }
    }
}

/// Picks the cache for the server: Redis when `redis_url` is set and reachable, otherwise an
/// in-process [`MemoryCache`].
#[cfg(feature = "ssr")]
pub fn open_cache(redis_url: Option<&str>, timeout: Duration) -> Arc<dyn Cache> {
    let Some(url) = redis_url else {
        info!("REDIS_URL not set, using in-process cache");
        return Arc::new(MemoryCache::new());
    };

    match RedisCache::open(url, timeout).and_then(|cache| cache.ping().map(|_| cache)) {
        Ok(cache) => {
            info!("Using Redis cache");
            Arc::new(cache)
        }
        Err(e) => {
            warn!("Redis unavailable ({e}), using in-process cache");
            Arc::new(MemoryCache::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache.set("a", "1".to_string(), Duration::from_secs(30));
        assert_eq!(cache.get("a"), Some("1".to_string()));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache.set("a", "1".to_string(), Duration::ZERO);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_del() {
        let cache = MemoryCache::new();
        cache.set(LEADERBOARD_CACHE_KEY, "[]".to_string(), Duration::from_secs(30));
        cache.del(LEADERBOARD_CACHE_KEY);
        assert_eq!(cache.get(LEADERBOARD_CACHE_KEY), None);

        // Deleting a missing key is a no-op.
        cache.del("missing");
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let cache = MemoryCache::new();
        cache.set("k", "old".to_string(), Duration::from_secs(30));
        cache.set("k", "new".to_string(), Duration::from_secs(30));
        assert_eq!(cache.get("k"), Some("new".to_string()));
    }

    #[test]
    fn test_predictions_cache_key() {
        assert_eq!(predictions_cache_key(7), "predictions:7");
    }

    #[cfg(feature = "ssr")]
    #[test]
    fn test_redis_cache_rejects_invalid_url() {
        assert!(RedisCache::open("not a url", Duration::from_millis(200)).is_err());
    }

    // Nothing listens on port 1, so every command fails.
    #[cfg(feature = "ssr")]
    #[test]
    fn test_unreachable_redis_reads_as_miss() {
        let cache = RedisCache::open("redis://127.0.0.1:1/", Duration::from_millis(200))
            .expect("URL should parse");
        cache.set("k", "v".to_string(), Duration::from_secs(30));
        assert_eq!(cache.get("k"), None);
        cache.del("k");
        assert!(cache.ping().is_err());
    }

    #[cfg(feature = "ssr")]
    #[test]
    fn test_open_cache_falls_back_to_memory() {
        let timeout = Duration::from_millis(200);
        for url in [None, Some("not a url"), Some("redis://127.0.0.1:1/")] {
            let cache = open_cache(url, timeout);
            cache.set("k", "v".to_string(), Duration::from_secs(30));
            assert_eq!(cache.get("k"), Some("v".to_string()));
        }
    }
}
