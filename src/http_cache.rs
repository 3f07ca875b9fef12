use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "ata_standings";
const CACHE_FILE: &str = "page_cache.json";

/// URL-keyed store for fetched page bodies. Owned by the caller and handed
/// to the fetcher; implementations decide their own expiry.
pub trait PageCache: Send + Sync {
    fn get(&self, url: &str) -> Option<String>;
    fn put(&self, url: &str, body: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Off,
    Memory,
    Disk,
}

impl CacheMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "0" => Some(CacheMode::Off),
            "memory" | "mem" => Some(CacheMode::Memory),
            "disk" | "file" => Some(CacheMode::Disk),
            _ => None,
        }
    }
}

pub fn build_page_cache(
    mode: CacheMode,
    ttl: Duration,
    max_entries: usize,
) -> Option<Box<dyn PageCache>> {
    match mode {
        CacheMode::Off => None,
        CacheMode::Memory => Some(Box::new(MemoryPageCache::new(ttl, max_entries))),
        CacheMode::Disk => match DiskPageCache::default_location(ttl) {
            Some(cache) => Some(Box::new(cache)),
            None => {
                warn!("no cache directory available, falling back to memory cache");
                Some(Box::new(MemoryPageCache::new(ttl, max_entries)))
            }
        },
    }
}

struct MemoryEntry {
    body: String,
    stored_at: Instant,
}

/// In-process cache with a time-to-live and a capacity bound. When full,
/// expired entries go first, then the oldest one.
pub struct MemoryPageCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryPageCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageCache for MemoryPageCache {
    fn get(&self, url: &str) -> Option<String> {
        let mut entries = lock(&self.entries);
        let fresh = entries
            .get(url)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;
        if !fresh {
            entries.remove(url);
            return None;
        }
        entries.get(url).map(|entry| entry.body.clone())
    }

    fn put(&self, url: &str, body: &str) {
        let mut entries = lock(&self.entries);
        if !entries.contains_key(url) && entries.len() >= self.max_entries {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(key, _)| key.clone());
                if let Some(key) = oldest {
                    entries.remove(&key);
                }
            }
        }
        entries.insert(
            url.to_string(),
            MemoryEntry {
                body: body.to_string(),
                stored_at: Instant::now(),
            },
        );
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PageCacheFile {
    version: u32,
    entries: HashMap<String, DiskEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DiskEntry {
    body: String,
    fetched_at: i64,
}

/// JSON file cache that survives between runs. Expired entries are dropped
/// whenever the file is rewritten.
pub struct DiskPageCache {
    path: PathBuf,
    ttl: Duration,
    state: Mutex<Option<PageCacheFile>>,
}

impl DiskPageCache {
    pub fn at(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            state: Mutex::new(None),
        }
    }

    pub fn default_location(ttl: Duration) -> Option<Self> {
        cache_path().map(|path| Self::at(path, ttl))
    }

    fn is_fresh(&self, entry: &DiskEntry, now: i64) -> bool {
        let age = now.saturating_sub(entry.fetched_at);
        age >= 0 && (age as u64) < self.ttl.as_secs()
    }
}

impl PageCache for DiskPageCache {
    fn get(&self, url: &str) -> Option<String> {
        let mut guard = lock(&self.state);
        let cache = guard.get_or_insert_with(|| load_cache_file(&self.path));
        let entry = cache.entries.get(url)?;
        if self.is_fresh(entry, now_secs()) {
            debug!(url, "page cache hit");
            Some(entry.body.clone())
        } else {
            None
        }
    }

    fn put(&self, url: &str, body: &str) {
        let mut guard = lock(&self.state);
        let cache = guard.get_or_insert_with(|| load_cache_file(&self.path));
        let now = now_secs();
        cache.version = CACHE_VERSION;
        cache.entries.retain(|_, entry| self.is_fresh(entry, now));
        cache.entries.insert(
            url.to_string(),
            DiskEntry {
                body: body.to_string(),
                fetched_at: now,
            },
        );
        if let Err(err) = save_cache_file(&self.path, cache) {
            warn!(path = %self.path.display(), "page cache write failed: {err:#}");
        }
    }
}

fn load_cache_file(path: &Path) -> PageCacheFile {
    let Ok(raw) = fs::read_to_string(path) else {
        return PageCacheFile::default();
    };
    let cache = serde_json::from_str::<PageCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return PageCacheFile::default();
    }
    cache
}

fn save_cache_file(path: &Path, cache: &PageCacheFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create page cache dir")?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize page cache")?;
    fs::write(&tmp, json).context("write page cache")?;
    fs::rename(&tmp, path).context("swap page cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(CACHE_FILE))
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

// A panic while holding the lock leaves the map itself intact.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
