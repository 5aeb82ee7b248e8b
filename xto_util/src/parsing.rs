use std::collections::HashMap;
use thiserror::Error;

use url::Url;

#[derive(Debug, Clone, Error)]
pub enum ParsingError {
    #[error("Invalid key-value list: {0}")]
    InvalidKeyVal(String),
}

type Result<T> = std::result::Result<T, ParsingError>;

pub fn parse_cookie_str(cookie_str: &str) -> Result<HashMap<String, String>> {
    parse_kv_list(cookie_str, ';')
}

/// Find a single cookie by name in a `Cookie` header style string.
/// Empty values count as absent.
pub fn find_cookie(cookie_str: &str, name: &str) -> Option<String> {
    cookie_str
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether the host of `url` ends with any of `hosts`, or, for URLs that cannot be
/// parsed, whether the raw string mentions one of them.
pub fn host_matches(url: &str, hosts: &[String]) -> bool {
    match Url::parse(url).ok().and_then(|u| u.host_str().map(|h| h.to_string())) {
        Some(host) => hosts.iter().any(|h| host == *h || host.ends_with(&format!(".{}", h))),
        None => hosts.iter().any(|h| url.contains(h.as_str())),
    }
}

/// Parse a list of key-value pairs separated by `sep`. Usually from a query string or cookie string.
fn parse_kv_list(s: &str, sep: char) -> Result<HashMap<String, String>> {
    let mut results = HashMap::new();
    for param in s.split(sep) {
        if param.contains('=') {
            let mut parts = param.splitn(2, '=');
            let key = parts.next().ok_or(ParsingError::InvalidKeyVal(param.to_string()))?;
            let value = parts.next().ok_or(ParsingError::InvalidKeyVal(param.to_string()))?;
            results.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(results)
}
