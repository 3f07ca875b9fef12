use std::collections::HashMap;
use std::fs;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::http_cache::PageCache;
use crate::http_client::http_client;

/// Source of raw page bodies. A fetch that fails for any reason yields
/// `None`; callers treat that as an empty page.
pub trait PageFetcher: Sync {
    fn fetch(&self, url: &str) -> Option<String>;
}

/// How long a failed URL is answered with `None` without a new request.
pub const DEFAULT_FAILURE_TTL: Duration = Duration::from_secs(60);

/// Blocking fetcher over the shared client. With a page cache configured,
/// bodies are cached by URL and failures are remembered for a short while,
/// so a region with no standings page is not requested again on every run
/// of a long-lived process. Without a cache every call hits the network.
pub struct HttpFetcher {
    client: Client,
    cache: Option<Box<dyn PageCache>>,
    failure_ttl: Duration,
    failures: Mutex<HashMap<String, Instant>>,
}

impl HttpFetcher {
    pub fn new(cache: Option<Box<dyn PageCache>>) -> Result<Self> {
        let client = http_client()?.clone();
        Ok(Self::with_client(client, cache))
    }

    pub fn with_client(client: Client, cache: Option<Box<dyn PageCache>>) -> Self {
        Self {
            client,
            cache,
            failure_ttl: DEFAULT_FAILURE_TTL,
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_failure_ttl(mut self, ttl: Duration) -> Self {
        self.failure_ttl = ttl;
        self
    }

    fn failed_recently(&self, url: &str) -> bool {
        let mut failures = self.failures();
        let Some(failed_at) = failures.get(url).copied() else {
            return false;
        };
        if failed_at.elapsed() < self.failure_ttl {
            return true;
        }
        failures.remove(url);
        false
    }

    fn failures(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Option<String> {
        if let Some(cache) = self.cache.as_deref() {
            if let Some(body) = cache.get(url) {
                debug!(url, "served from page cache");
                return Some(body);
            }
            if self.failed_recently(url) {
                debug!(url, "skipping recently failed page");
                return None;
            }
        }

        match fetch_page_text(&self.client, url) {
            Ok(body) => {
                if let Some(cache) = self.cache.as_deref() {
                    cache.put(url, &body);
                }
                Some(body)
            }
            Err(err) => {
                warn!(url, "page fetch failed: {err:#}");
                if self.cache.is_some() {
                    self.failures().insert(url.to_string(), Instant::now());
                }
                None
            }
        }
    }
}

fn fetch_page_text(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header(ACCEPT, "text/html,text/csv;q=0.9,*/*;q=0.8")
        .send()
        .context("request failed")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(anyhow!("http {status}"));
    }
    resp.text().context("failed reading body")
}

/// Read a sheet or mapping file from a local path or an http(s) URL. URLs
/// go through the fetcher so they share its cache.
pub fn load_text_source(fetcher: &dyn PageFetcher, location: &str) -> Option<String> {
    let location = location.trim();
    if location.starts_with("http://") || location.starts_with("https://") {
        return fetcher.fetch(location);
    }
    match fs::read_to_string(location) {
        Ok(raw) => Some(raw),
        Err(err) => {
            warn!(path = location, "could not read file: {err}");
            None
        }
    }
}
