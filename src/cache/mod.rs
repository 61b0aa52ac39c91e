//! Listing cache for offline viewing.
//!
//! This module provides disk-based caching to keep the last fetched stock
//! listings available when the server is unreachable. Features include:
//! - Configurable TTL (time-to-live)
//! - Per-profile cache separation
//! - Cache size limits with oldest-first eviction
//! - Listing pages keyed by a hash of the query parameters

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::api::types::{PagedResults, StockItem};
use crate::api::StockListQuery;

/// Default cache TTL in minutes.
pub const DEFAULT_CACHE_TTL_MINUTES: u32 = 30;

/// Default maximum cache size in MB.
pub const DEFAULT_MAX_CACHE_SIZE_MB: u64 = 50;

/// Cache status indicating data freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Data was freshly fetched from the server.
    Fresh,
    /// Data was served from cache (still valid).
    FromCache,
    /// Data was served from cache while offline.
    Offline,
}

impl CacheStatus {
    /// Get the display icon for the cache status.
    pub fn icon(&self) -> &'static str {
        match self {
            CacheStatus::Fresh => "●",
            CacheStatus::FromCache => "○",
            CacheStatus::Offline => "✗",
        }
    }

    /// Get the display text for the cache status.
    pub fn text(&self) -> &'static str {
        match self {
            CacheStatus::Fresh => "Live",
            CacheStatus::FromCache => "Cached",
            CacheStatus::Offline => "Offline",
        }
    }

    /// Check if the status indicates cached data.
    pub fn is_cached(&self) -> bool {
        matches!(self, CacheStatus::FromCache | CacheStatus::Offline)
    }
}

/// A cache entry with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the entry was cached (Unix timestamp).
    pub cached_at: u64,
    /// When the entry expires (Unix timestamp).
    pub expires_at: u64,
}

impl<T> CacheEntry<T> {
    /// Create a new cache entry with the given TTL.
    pub fn new(data: T, ttl: Duration) -> Self {
        let now = unix_now();
        Self {
            data,
            cached_at: now,
            expires_at: now + ttl.as_secs(),
        }
    }

    /// Check if the cache entry has expired.
    pub fn is_expired(&self) -> bool {
        unix_now() > self.expires_at
    }

    /// Get the age of the cache entry.
    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// Cache manager for storing and retrieving listing data.
pub struct CacheManager {
    /// Base directory for cache storage.
    base_dir: PathBuf,
    /// Current profile name.
    profile: String,
    /// Cache TTL.
    ttl: Duration,
    /// Maximum cache size in bytes.
    max_size_bytes: u64,
}

impl CacheManager {
    /// Create a new cache manager for the given profile.
    ///
    /// # Arguments
    ///
    /// * `profile` - The profile name (used for cache separation)
    /// * `ttl_minutes` - Cache TTL in minutes
    pub fn new(profile: &str, ttl_minutes: u32) -> io::Result<Self> {
        let base_dir = dirs::cache_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No cache directory available"))?
            .join("lazystock");

        Ok(Self::with_base_dir(base_dir, profile, ttl_minutes))
    }

    /// Create a cache manager rooted at a specific directory.
    ///
    /// Used by tests to avoid touching the real cache.
    pub fn with_base_dir(base_dir: PathBuf, profile: &str, ttl_minutes: u32) -> Self {
        Self {
            base_dir,
            profile: profile.to_string(),
            ttl: Duration::from_secs(ttl_minutes as u64 * 60),
            max_size_bytes: DEFAULT_MAX_CACHE_SIZE_MB * 1024 * 1024,
        }
    }

    /// Override the maximum cache size.
    pub fn set_max_size_mb(&mut self, max_size_mb: u64) {
        self.max_size_bytes = max_size_mb * 1024 * 1024;
    }

    /// Get the profile-specific cache directory.
    fn profile_dir(&self) -> PathBuf {
        self.base_dir.join(&self.profile)
    }

    /// Get the path for a cached stock item.
    fn item_path(&self, pk: i64) -> PathBuf {
        self.profile_dir()
            .join("items")
            .join(format!("{}.json", pk))
    }

    /// Get the path for a cached listing page.
    ///
    /// Pages are keyed by a hash of the query parameters so distinct
    /// parents, searches and offsets never collide.
    fn listing_path(&self, query: &StockListQuery) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        query.parent.hash(&mut hasher);
        query.search.hash(&mut hasher);
        query.offset.hash(&mut hasher);
        query.limit.hash(&mut hasher);
        let hash = hasher.finish();

        self.profile_dir()
            .join("listings")
            .join(format!("{:016x}.json", hash))
    }

    /// Get a cached stock item.
    ///
    /// Returns `None` if the item is not cached or has expired.
    pub fn get_item(&self, pk: i64) -> Option<StockItem> {
        self.read_cache(&self.item_path(pk))
    }

    /// Store a stock item in the cache.
    ///
    /// Items without a primary key are not cacheable and are skipped.
    pub fn set_item(&self, item: &StockItem) -> io::Result<()> {
        let Some(pk) = item.pk else {
            return Ok(());
        };
        self.write_cache(&self.item_path(pk), item)?;
        self.check_cache_size()
    }

    /// Get a cached listing page for a query.
    ///
    /// Returns `None` if the page is not cached or has expired.
    pub fn get_listing(&self, query: &StockListQuery) -> Option<PagedResults<StockItem>> {
        self.read_cache(&self.listing_path(query))
    }

    /// Store a listing page in the cache.
    pub fn set_listing(
        &self,
        query: &StockListQuery,
        page: &PagedResults<StockItem>,
    ) -> io::Result<()> {
        self.write_cache(&self.listing_path(query), page)?;
        self.check_cache_size()
    }

    /// Read a cache entry from disk.
    fn read_cache<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!("Failed to read cache file {:?}: {}", path, e);
                }
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(e) => {
                debug!("Failed to parse cache entry {:?}: {}", path, e);
                // Remove corrupted cache file
                let _ = fs::remove_file(path);
                return None;
            }
        };

        if entry.is_expired() {
            trace!("Cache expired for {:?}", path);
            let _ = fs::remove_file(path);
            return None;
        }

        trace!("Cache hit for {:?} (age: {:?})", path, entry.age());
        Some(entry.data)
    }

    /// Write a cache entry to disk.
    fn write_cache<T: Serialize>(&self, path: &Path, data: &T) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entry = CacheEntry::new(data, self.ttl);
        let content = serde_json::to_string(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(path, content)?;
        trace!("Cached data to {:?}", path);
        Ok(())
    }

    /// Invalidate all cached listing pages.
    ///
    /// Called after a refresh so stale pages are not served again.
    pub fn invalidate_listings(&self) -> io::Result<()> {
        let dir = self.profile_dir().join("listings");
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            debug!("Invalidated all listing caches");
        }
        Ok(())
    }

    /// Clear all cached data for this profile.
    pub fn clear(&self) -> io::Result<()> {
        let dir = self.profile_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            debug!("Cleared all cache for profile {}", self.profile);
        }
        Ok(())
    }

    /// Check cache size and evict old entries if necessary.
    fn check_cache_size(&self) -> io::Result<()> {
        let size = self.calculate_size()?;
        if size > self.max_size_bytes {
            debug!(
                "Cache size {} bytes exceeds limit {} bytes, evicting",
                size, self.max_size_bytes
            );
            self.evict_oldest()?;
        }
        Ok(())
    }

    /// Calculate the total size of the cache.
    fn calculate_size(&self) -> io::Result<u64> {
        let profile_dir = self.profile_dir();
        if !profile_dir.exists() {
            return Ok(0);
        }

        let mut total_size: u64 = 0;
        for entry in walkdir::WalkDir::new(&profile_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if let Ok(metadata) = entry.metadata() {
                total_size += metadata.len();
            }
        }
        Ok(total_size)
    }

    /// Evict the oldest cache entries until under the size limit.
    fn evict_oldest(&self) -> io::Result<()> {
        let profile_dir = self.profile_dir();
        if !profile_dir.exists() {
            return Ok(());
        }

        let mut entries: Vec<(PathBuf, SystemTime)> = Vec::new();

        for entry in walkdir::WalkDir::new(&profile_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if let Ok(metadata) = entry.metadata() {
                if let Ok(modified) = metadata.modified() {
                    entries.push((entry.path().to_path_buf(), modified));
                }
            }
        }

        // Oldest first
        entries.sort_by_key(|(_, time)| *time);

        // Delete the oldest quarter of entries
        let to_delete = (entries.len() / 4).max(1);
        for (path, _) in entries.into_iter().take(to_delete) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to evict cache file {:?}: {}", path, e);
            } else {
                debug!("Evicted old cache file {:?}", path);
            }
        }

        Ok(())
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let profile_dir = self.profile_dir();
        let mut file_count = 0u64;
        let mut total_size = 0u64;

        if profile_dir.exists() {
            for entry in walkdir::WalkDir::new(&profile_dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                file_count += 1;
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }

        CacheStats {
            file_count,
            total_size_bytes: total_size,
            max_size_bytes: self.max_size_bytes,
            ttl_seconds: self.ttl.as_secs(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cached files.
    pub file_count: u64,
    /// Total size in bytes.
    pub total_size_bytes: u64,
    /// Maximum size in bytes.
    pub max_size_bytes: u64,
    /// TTL in seconds.
    pub ttl_seconds: u64,
}
