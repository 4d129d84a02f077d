//! Configuration Module
//!
//! Cache settings loaded once at startup from environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::DEFAULT_MAX_ENTRIES_PER_BUCKET;
use crate::error::CacheError;
use crate::keys::Category;

// == Backend ==
/// Which store the cache runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Redis,
    Memory,
    /// Every operation is a no-op or a miss
    Disabled,
}

impl FromStr for Backend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(Backend::Redis),
            "memory" => Ok(Backend::Memory),
            "disabled" | "none" | "null" => Ok(Backend::Disabled),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown cache backend '{}'",
                other
            ))),
        }
    }
}

// == Category Timeouts ==
/// Bucket lifetime per cache category. `None` means no expiration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTimeouts {
    pub thumbnail: Option<Duration>,
    pub image: Option<Duration>,
    pub json: Option<Duration>,
}

impl CategoryTimeouts {
    /// Same lifetime for every category.
    pub fn uniform(timeout: Option<Duration>) -> Self {
        Self {
            thumbnail: timeout,
            image: timeout,
            json: timeout,
        }
    }

    /// Per-category seconds, falling back to `default` for missing categories.
    pub fn from_map(map: &HashMap<Category, u64>, default: Option<Duration>) -> Self {
        let pick = |category: Category| {
            map.get(&category)
                .map(|secs| Duration::from_secs(*secs))
                .or(default)
        };
        Self {
            thumbnail: pick(Category::Thumbnail),
            image: pick(Category::Image),
            json: pick(Category::Json),
        }
    }

    pub fn for_category(&self, category: Category) -> Option<Duration> {
        match category {
            Category::Thumbnail => self.thumbnail,
            Category::Image => self.image,
            Category::Json => self.json,
        }
    }
}

// == Config ==
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u32,
    pub timeouts: CategoryTimeouts,
    /// Entry ceiling of one in-memory bucket
    pub max_entries_per_bucket: usize,
    /// Interval in seconds between expired bucket sweeps (memory backend)
    pub cleanup_interval: u64,
}

impl Config {
    /// Loads the configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `redis`, `memory` or `disabled` (default: redis)
    /// - `REDIS_HOST` - Redis host (default: localhost)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `REDIS_DB` - Redis database index (default: 0)
    /// - `REDIS_DEFAULT_TIMEOUT` - bucket lifetime in seconds for every category
    /// - `REDIS_TIMEOUTS` - JSON object of per-category lifetimes, e.g.
    ///   `{"thumbnail": 86400, "image": 3600}`; overrides the default
    /// - `MEMORY_MAX_ENTRIES` - entry ceiling per in-memory bucket (default: 10000)
    /// - `CLEANUP_INTERVAL` - sweep interval in seconds (default: 60)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_timeout = parse_var::<u64, _>(&lookup, "REDIS_DEFAULT_TIMEOUT")
            .map(Duration::from_secs);
        let timeouts = match lookup("REDIS_TIMEOUTS") {
            Some(raw) => match serde_json::from_str::<HashMap<Category, u64>>(&raw) {
                Ok(map) => CategoryTimeouts::from_map(&map, default_timeout),
                Err(e) => {
                    warn!("Ignoring REDIS_TIMEOUTS '{}': {}", raw, e);
                    CategoryTimeouts::uniform(default_timeout)
                }
            },
            None => CategoryTimeouts::uniform(default_timeout),
        };

        Self {
            backend: parse_var(&lookup, "CACHE_BACKEND").unwrap_or(defaults.backend),
            redis_host: lookup("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_var(&lookup, "REDIS_PORT").unwrap_or(defaults.redis_port),
            redis_db: parse_var(&lookup, "REDIS_DB").unwrap_or(defaults.redis_db),
            timeouts,
            max_entries_per_bucket: parse_var(&lookup, "MEMORY_MAX_ENTRIES")
                .unwrap_or(defaults.max_entries_per_bucket),
            cleanup_interval: parse_var(&lookup, "CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Connection URL for the Redis backend.
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Redis,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_db: 0,
            timeouts: CategoryTimeouts::default(),
            max_entries_per_bucket: DEFAULT_MAX_ENTRIES_PER_BUCKET,
            cleanup_interval: 60,
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring {}='{}': {}", name, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Redis);
        assert_eq!(config.redis_url(), "redis://localhost:6379/0");
        assert_eq!(config.timeouts, CategoryTimeouts::uniform(None));
        assert_eq!(config.max_entries_per_bucket, 10_000);
    }

    #[test]
    fn test_config_empty_lookup_uses_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.redis_host, "localhost");
        assert_eq!(config.redis_port, 6379);
        assert_eq!(config.redis_db, 0);
        assert_eq!(config.timeouts.image, None);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("CACHE_BACKEND", "memory"),
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_DB", "2"),
            ("REDIS_DEFAULT_TIMEOUT", "60"),
        ]));
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.redis_url(), "redis://cache.internal:6380/2");
        assert_eq!(
            config.timeouts,
            CategoryTimeouts::uniform(Some(Duration::from_secs(60)))
        );
    }

    #[test]
    fn test_config_category_timeouts() {
        let config = Config::from_lookup(lookup_from(&[
            ("REDIS_DEFAULT_TIMEOUT", "30"),
            ("REDIS_TIMEOUTS", r#"{"thumbnail": 86400, "image": 3600}"#),
        ]));
        assert_eq!(config.timeouts.thumbnail, Some(Duration::from_secs(86400)));
        assert_eq!(config.timeouts.image, Some(Duration::from_secs(3600)));
        assert_eq!(config.timeouts.json, Some(Duration::from_secs(30)));
        assert_eq!(
            config.timeouts.for_category(Category::Image),
            Some(Duration::from_secs(3600))
        );
    }

    #[test]
    fn test_config_accepts_largest_timeout() {
        let config = Config::from_lookup(lookup_from(&[(
            "REDIS_DEFAULT_TIMEOUT",
            "18446744073709551615",
        )]));
        assert_eq!(
            config.timeouts,
            CategoryTimeouts::uniform(Some(Duration::from_secs(u64::MAX)))
        );
    }

    #[test]
    fn test_config_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("CACHE_BACKEND", "memcached"),
            ("REDIS_PORT", "not-a-port"),
            ("REDIS_TIMEOUTS", "{broken"),
        ]));
        assert_eq!(config.backend, Backend::Redis);
        assert_eq!(config.redis_port, 6379);
        assert_eq!(config.timeouts, CategoryTimeouts::uniform(None));
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("REDIS".parse::<Backend>().unwrap(), Backend::Redis);
        assert_eq!("none".parse::<Backend>().unwrap(), Backend::Disabled);
        assert!("memcached".parse::<Backend>().is_err());
    }
}
