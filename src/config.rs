use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Password for the admin login. Admin login is disabled when unset.
    pub admin_password: Option<String>,
    /// Redis backs the cache when set, otherwise the cache is in-process.
    pub redis_url: Option<String>,
    pub forbid_self_pairs: bool,
    pub leaderboard_ttl: Duration,
    pub predictions_ttl: Duration,
    pub storage_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the environment, after loading `.env` if present.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env."),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
            redis_url: non_empty_var("REDIS_URL"),
            forbid_self_pairs: try_load("FORBID_SELF_PAIRS", true),
            leaderboard_ttl: Duration::from_secs(try_load("LEADERBOARD_TTL_SECS", 30)),
            predictions_ttl: Duration::from_secs(try_load("PREDICTIONS_TTL_SECS", 10)),
            storage_timeout: Duration::from_millis(try_load("STORAGE_TIMEOUT_MS", 5000)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            admin_password: None,
            redis_url: None,
            forbid_self_pairs: true,
            leaderboard_ttl: Duration::from_secs(30),
            predictions_ttl: Duration::from_secs(10),
            storage_timeout: Duration::from_millis(5000),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or("X", "42", 7u64), 42);
        assert_eq!(parse_or("X", " 42 ", 7u64), 42);
        assert_eq!(parse_or("X", "forty", 7u64), 7);
        assert!(!parse_or("X", "false", true));
        assert!(parse_or("X", "nope", true));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.forbid_self_pairs);
        assert_eq!(config.leaderboard_ttl, Duration::from_secs(30));
        assert!(config.admin_password.is_none());
        assert!(config.redis_url.is_none());
    }
}
