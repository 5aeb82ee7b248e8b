use std::env;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use twitter_client::consts::{DEFAULT_TRUSTED_SCRIPT_HOSTS, HOST_ORIGIN};

use crate::error::{Error, Result};

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_MAX_DEPTH: usize = 40;

/// Settings shared by every component of one page context.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of resolved texts kept in memory.
    pub cache_capacity: usize,
    /// How long a bridge request waits for its reply.
    pub bridge_timeout: Duration,
    /// Nesting limit when mining API payloads for post records.
    pub max_depth: usize,
    /// Origin whose cookies hold the session credential; relative script sources resolve against it.
    pub host_origin: Url,
    /// Script hosts whose bundles may be fetched and scanned.
    pub trusted_script_hosts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            bridge_timeout: Duration::from_millis(DEFAULT_BRIDGE_TIMEOUT_MS),
            max_depth: DEFAULT_MAX_DEPTH,
            host_origin: Url::parse(HOST_ORIGIN).expect("host origin is a valid URL"),
            trusted_script_hosts: DEFAULT_TRUSTED_SCRIPT_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl Config {
    /// Read overrides from `XTO_*` environment variables, keeping defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        if let Some(capacity) = parse_var::<usize>("XTO_CACHE_CAPACITY")? {
            config.cache_capacity = capacity;
        }
        if let Some(timeout) = parse_var::<u64>("XTO_BRIDGE_TIMEOUT_MS")? {
            config.bridge_timeout = Duration::from_millis(timeout);
        }
        if let Some(depth) = parse_var::<usize>("XTO_MAX_DEPTH")? {
            config.max_depth = depth;
        }
        if let Ok(origin) = env::var("XTO_HOST_ORIGIN") {
            config.host_origin = Url::parse(&origin)?;
        }
        if let Ok(hosts) = env::var("XTO_TRUSTED_HOSTS") {
            config.trusted_script_hosts = hosts
                .split(',')
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect();
        }
        if config.cache_capacity == 0 {
            return Err(Error::InvalidConfig("XTO_CACHE_CAPACITY must be positive".to_string()));
        }
        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{} = {}", name, value))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.bridge_timeout, Duration::from_secs(8));
        assert_eq!(config.max_depth, 40);
        assert_eq!(config.host_origin.as_str(), "https://x.com/");
        assert_eq!(config.trusted_script_hosts, vec!["twimg.com".to_string(), "x.com".to_string()]);
    }

    #[test]
    fn test_parse_var() {
        env::set_var("XTO_TEST_PARSE_VAR_OK", " 250 ");
        env::set_var("XTO_TEST_PARSE_VAR_BAD", "many");
        assert_eq!(parse_var::<usize>("XTO_TEST_PARSE_VAR_OK").unwrap(), Some(250));
        assert!(matches!(
            parse_var::<usize>("XTO_TEST_PARSE_VAR_BAD"),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(parse_var::<usize>("XTO_TEST_PARSE_VAR_UNSET").unwrap(), None);
    }
}
