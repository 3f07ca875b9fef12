use std::env;
use std::time::Duration;

use crate::http_cache::CacheMode;

pub const DEFAULT_BASE_URL: &str = "https://atamartialarts.com/events/tournament-standings";
pub const DEFAULT_DIVISION_CODE: &str = "W01D";

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub division_code: String,
    pub fetch_parallelism: usize,
    pub cache_mode: CacheMode,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub breakdown_sheet: Option<String>,
    pub district_sheet: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        let cache_mode = opt_env("PAGE_CACHE")
            .and_then(|val| CacheMode::parse(&val))
            .unwrap_or(CacheMode::Memory);
        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(3600);
        let cache_max_entries = env::var("CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(256)
            .max(1);
        Self {
            base_url: opt_env("STANDINGS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            division_code: opt_env("DIVISION_CODE")
                .map(|val| val.trim().to_string())
                .unwrap_or_else(|| DEFAULT_DIVISION_CODE.to_string()),
            fetch_parallelism: fetch_parallelism(),
            cache_mode,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_max_entries,
            breakdown_sheet: opt_env("BREAKDOWN_SHEET"),
            district_sheet: opt_env("DISTRICT_SHEET"),
        }
    }
}

pub fn fetch_timeout_secs() -> u64 {
    env::var("FETCH_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(10)
        .clamp(1, 60)
}

pub fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.trim().parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(1, 32)
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}
