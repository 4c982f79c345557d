//! Bounded FIFO snapshot cache over the record store.
//!
//! Entries are point-in-time copies, not live references; the store's write
//! path overwrites a snapshot whenever the underlying record takes a click.
//! Eviction is strict insertion order, independent of read recency.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::models::UrlRecord;

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

struct CacheInner {
    entries: HashMap<String, UrlRecord>,
    /// Insertion order; may hold keys already removed from `entries`, which
    /// eviction skips over.
    order: VecDeque<String>,
}

pub struct HotCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl HotCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Return a snapshot while its own copied expiry is still in the future;
    /// expired snapshots are evicted lazily on this read path.
    pub fn get(&self, short_code: &str, now: DateTime<Utc>) -> Option<UrlRecord> {
        let mut inner = self.lock();
        match inner.entries.get(short_code) {
            Some(snapshot) if !snapshot.is_expired(now) => Some(snapshot.clone()),
            Some(_) => {
                inner.entries.remove(short_code);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite a snapshot. Overwrites keep the key's original
    /// position in the eviction order; new keys at capacity evict the single
    /// oldest still-present insertion first.
    pub fn put(&self, record: UrlRecord) {
        let mut inner = self.lock();
        let short_code = record.short_code.clone();

        if inner.entries.contains_key(&short_code) {
            inner.entries.insert(short_code, record);
            return;
        }

        while inner.entries.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.order.push_back(short_code.clone());
        inner.entries.insert(short_code, record);
    }

    /// Overwrite a snapshot only if the key is already cached.
    pub fn update(&self, record: &UrlRecord) {
        let mut inner = self.lock();
        if let Some(snapshot) = inner.entries.get_mut(&record.short_code) {
            *snapshot = record.clone();
        }
    }

    pub fn remove(&self, short_code: &str) {
        self.lock().entries.remove(short_code);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        // A poisoned lock only means a panic mid-mutation elsewhere; the map
        // itself is still structurally sound.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
