#![forbid(unsafe_code)]

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3_600;
pub const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub bind: SocketAddr,
    pub cache_ttl: Duration,
    pub api_url: Option<String>,
    pub api_timeout: Duration,
}

impl AdapterConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_env_var_map(|key| env::var(key).ok())
    }

    /// Out-of-range numbers fall back to their defaults; an unparseable bind address is an error.
    pub fn from_env_var_map<F>(get: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = non_empty(get("BEACONS_HTTP_BIND"))
            .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string());
        let bind: SocketAddr = bind_raw
            .parse()
            .map_err(|_| format!("BEACONS_HTTP_BIND must be host:port, got '{bind_raw}'"))?;

        let cache_ttl_seconds = bounded_u64(
            get("BEACONS_CACHE_TTL_SECONDS"),
            60,
            86_400,
            DEFAULT_CACHE_TTL_SECONDS,
        );
        let api_timeout_ms = bounded_u64(
            get("BEACONS_API_TIMEOUT_MS"),
            100,
            60_000,
            DEFAULT_API_TIMEOUT_MS,
        );
        let api_url = match non_empty(get("BEACONS_API_URL")) {
            Some(raw) => Some(normalise_api_url(&raw)?),
            None => None,
        };

        Ok(Self {
            bind,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            api_url,
            api_timeout: Duration::from_millis(api_timeout_ms),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn bounded_u64(value: Option<String>, min: u64, max: u64, default: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| (min..=max).contains(v))
        .unwrap_or(default)
}

fn normalise_api_url(raw: &str) -> Result<String, String> {
    let parsed =
        url::Url::parse(raw).map_err(|err| format!("BEACONS_API_URL is not a valid url: {err}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err("BEACONS_API_URL must use http or https".to_string());
    }
    Ok(raw.trim_end_matches('/').to_string())
}
