//! In-memory cache of whole volume files
//!
//! Files are read once, kept as shared [`Bytes`], and dropped only on an
//! explicit [`FileCache::evict`] or [`FileCache::clear`]. Hosts evict when the
//! panel or session showing a file closes. Global extrema are memoised per
//! file, element type and byte order, and forgotten together with the file.
//!
//! Every load gets a fresh generation number; an extrema scan is only
//! memoised if the generation it scanned is still the cached one.

use crate::error::{RawSliceError, Result};
use crate::io::FileAccess;
use crate::stats::compute_extrema;
use crate::types::{ByteOrder, ElementType, Extrema};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExtremaKey {
    resource: String,
    element_type: ElementType,
    byte_order: ByteOrder,
}

#[derive(Clone)]
struct CachedFile {
    data: Bytes,
    generation: u64,
}

/// Cache of file contents keyed by resource name
pub struct FileCache {
    access: Arc<dyn FileAccess>,
    max_file_size: u64,
    files: RwLock<HashMap<String, CachedFile>>,
    extrema: RwLock<HashMap<ExtremaKey, Extrema>>,
    /// Per-key locks so concurrent misses read a file once
    loading: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    next_generation: AtomicU64,
}

impl FileCache {
    /// Create an empty cache that refuses files larger than `max_file_size` bytes
    pub fn new(access: Arc<dyn FileAccess>, max_file_size: u64) -> Self {
        Self {
            access,
            max_file_size,
            files: RwLock::new(HashMap::new()),
            extrema: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Get file contents, reading them on a miss
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        Ok(self.load(key).await?.data)
    }

    async fn load(&self, key: &str) -> Result<CachedFile> {
        let cached = self.files.read().get(key).cloned();
        if let Some(file) = cached {
            debug!(key, "file cache hit");
            return Ok(file);
        }

        let lock = self.loading.lock().entry(key.to_string()).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            self.load_locked(key).await
        };
        self.loading.lock().remove(key);
        result
    }

    /// Read a file while holding its loading lock
    async fn load_locked(&self, key: &str) -> Result<CachedFile> {
        // Another caller may have finished loading while we waited
        let cached = self.files.read().get(key).cloned();
        if let Some(file) = cached {
            debug!(key, "file cache hit after concurrent load");
            return Ok(file);
        }

        let size = self.access.size(key).await?;
        if size > self.max_file_size {
            return Err(RawSliceError::SizeLimitExceeded {
                size,
                limit: self.max_file_size,
            });
        }

        let data = self.access.read(key).await?;
        let file = CachedFile {
            data,
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
        };
        debug!(
            key,
            bytes = file.data.len(),
            generation = file.generation,
            "file cache miss, loaded"
        );
        self.files.write().insert(key.to_string(), file.clone());
        Ok(file)
    }

    /// Contents of an already cached file, without touching storage
    pub fn cached(&self, key: &str) -> Result<Bytes> {
        self.files
            .read()
            .get(key)
            .map(|file| file.data.clone())
            .ok_or_else(|| RawSliceError::NotCached(key.to_string()))
    }

    /// Size of a resource, answered from the cache when possible
    pub async fn size(&self, key: &str) -> Result<u64> {
        let cached_len = self.files.read().get(key).map(|file| file.data.len());
        if let Some(len) = cached_len {
            return Ok(len as u64);
        }
        self.access.size(key).await
    }

    /// Drop a file and its memoised extrema; returns whether it was cached
    pub fn evict(&self, key: &str) -> bool {
        let removed = self.files.write().remove(key).is_some();
        self.extrema.write().retain(|k, _| k.resource != key);
        debug!(key, removed, "evicted file");
        removed
    }

    /// Drop every cached file
    pub fn clear(&self) {
        self.files.write().clear();
        self.extrema.write().clear();
        debug!("cleared file cache");
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.files.read().contains_key(key)
    }

    /// Number of cached files
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// Evict and read a file again from storage
    pub async fn reload(&self, key: &str) -> Result<Bytes> {
        self.evict(key);
        self.get(key).await
    }

    /// Extrema over the whole file, scanned once per element type and byte order
    pub async fn global_extrema(
        &self,
        key: &str,
        element_type: ElementType,
        byte_order: ByteOrder,
    ) -> Result<Extrema> {
        let extrema_key = ExtremaKey {
            resource: key.to_string(),
            element_type,
            byte_order,
        };
        let memoised = self.extrema.read().get(&extrema_key).copied();
        if let Some(extrema) = memoised {
            return Ok(extrema);
        }

        let CachedFile { data, generation } = self.load(key).await?;
        let extrema =
            tokio::task::spawn_blocking(move || compute_extrema(&data, element_type, byte_order))
                .await
                .map_err(|e| RawSliceError::Io(std::io::Error::other(e)))?;

        self.memoise(extrema_key, generation, extrema);
        Ok(extrema)
    }

    /// Store extrema scanned from `generation` if that buffer is still cached.
    ///
    /// The extrema lock is held across the check so an `evict` running
    /// concurrently clears the entry after it is written, never before.
    fn memoise(&self, extrema_key: ExtremaKey, generation: u64, extrema: Extrema) -> bool {
        let mut memo = self.extrema.write();
        let current = self
            .files
            .read()
            .get(&extrema_key.resource)
            .map(|file| file.generation);
        if current != Some(generation) {
            debug!(
                key = %extrema_key.resource,
                generation,
                "file changed during scan, not memoised"
            );
            return false;
        }
        memo.insert(extrema_key, extrema);
        true
    }
}
