//! Authoritative in-memory record store.
//!
//! Owns three keyed collections (records, per-record event logs, the
//! ever-allocated code set) plus the hot cache, and exposes only the
//! operations below; callers never touch the maps directly.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Duration, Utc};
use dashmap::{DashMap, DashSet};
use serde::Serialize;
use thiserror::Error;

use crate::analytics::{enrich_click, ClickEvent, ClickMetadata};
use crate::models::UrlRecord;
use crate::storage::cache::{HotCache, DEFAULT_CACHE_CAPACITY};

/// Per-record event logs keep this many most recent entries.
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Records are cached once their click count exceeds this.
pub const DEFAULT_HOT_THRESHOLD: u64 = 5;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("short code already exists")]
    Conflict,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_urls: usize,
    pub active_urls: usize,
    pub total_clicks: u64,
    pub cache_size: usize,
}

pub struct UrlStore {
    records: DashMap<String, UrlRecord>,
    events: DashMap<String, VecDeque<ClickEvent>>,
    /// Every code ever allocated in this process. Sweeping removes records
    /// but never these marks, so codes are not reused after deletion.
    allocated: DashSet<String>,
    cache: HotCache,
    hot_threshold: u64,
    /// Lifetime click total; survives sweeps of the records that earned it.
    lifetime_clicks: AtomicU64,
}

impl UrlStore {
    pub fn new(cache_capacity: usize, hot_threshold: u64) -> Self {
        Self {
            records: DashMap::new(),
            events: DashMap::new(),
            allocated: DashSet::new(),
            cache: HotCache::new(cache_capacity),
            hot_threshold,
            lifetime_clicks: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_HOT_THRESHOLD)
    }

    /// Allocate `short_code` and persist a record for it.
    ///
    /// The allocation-set insert is the uniqueness gate: it fails for any
    /// code ever allocated, live or already swept.
    pub fn create(
        &self,
        short_code: &str,
        original_url: &str,
        ttl_minutes: i64,
        description: Option<String>,
    ) -> StoreResult<UrlRecord> {
        if !self.allocated.insert(short_code.to_string()) {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let record = UrlRecord {
            short_code: short_code.to_string(),
            original_url: original_url.to_string(),
            description,
            created_at: now,
            expires_at: now + Duration::minutes(ttl_minutes),
            is_active: true,
            clicks: 0,
            last_accessed: None,
        };

        self.records.insert(short_code.to_string(), record.clone());
        self.events.insert(short_code.to_string(), VecDeque::new());
        Ok(record)
    }

    /// True for any code ever allocated, including swept ones.
    pub fn exists(&self, short_code: &str) -> bool {
        self.allocated.contains(short_code)
    }

    /// Expiry-aware lookup through the hot cache.
    ///
    /// An expired record is lazily marked inactive and reported absent;
    /// deleting it is the sweeper's job. A live record past the hot
    /// threshold is written through into the cache on this path.
    pub fn get(&self, short_code: &str) -> Option<UrlRecord> {
        let now = Utc::now();

        if let Some(snapshot) = self.cache.get(short_code, now) {
            return Some(snapshot);
        }

        let mut entry = self.records.get_mut(short_code)?;
        if entry.is_expired(now) {
            entry.is_active = false;
            return None;
        }

        if entry.clicks > self.hot_threshold {
            self.cache.put(entry.clone());
        }
        Some(entry.clone())
    }

    /// Count a click against `short_code`.
    ///
    /// Returns false for unknown codes. Expiry is deliberately not
    /// re-checked here: a redirect raced against the sweeper still counts.
    pub fn record_click(&self, short_code: &str, metadata: ClickMetadata) -> bool {
        let now = Utc::now();

        let Some(mut record) = self.records.get_mut(short_code) else {
            return false;
        };

        record.clicks += 1;
        record.last_accessed = Some(now);
        self.lifetime_clicks.fetch_add(1, Ordering::Relaxed);

        let event = enrich_click(metadata, now);
        let mut log = self.events.entry(short_code.to_string()).or_default();
        if log.len() == EVENT_LOG_CAPACITY {
            log.pop_front();
        }
        log.push_back(event);
        drop(log);

        self.cache.update(&record);
        true
    }

    /// Snapshot of the event log, present iff the record still exists.
    pub fn events(&self, short_code: &str) -> Option<Vec<ClickEvent>> {
        if !self.records.contains_key(short_code) {
            return None;
        }
        Some(
            self.events
                .get(short_code)
                .map(|log| log.iter().cloned().collect())
                .unwrap_or_default(),
        )
    }

    /// Delete every expired record along with its event log and cache entry.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .records
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        for short_code in &expired {
            self.records.remove(short_code);
            self.events.remove(short_code);
            self.cache.remove(short_code);
        }

        expired.len()
    }

    /// Live records, most recently created first. `page` is 1-based.
    /// Returns the page plus the total live count.
    pub fn list(&self, page: usize, per_page: usize) -> (Vec<UrlRecord>, usize) {
        let now = Utc::now();
        let mut live: Vec<UrlRecord> = self
            .records
            .iter()
            .filter(|entry| entry.value().is_active && !entry.value().is_expired(now))
            .map(|entry| entry.value().clone())
            .collect();

        live.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });

        let total = live.len();
        let start = page.saturating_sub(1).saturating_mul(per_page);
        let items = live.into_iter().skip(start).take(per_page).collect();
        (items, total)
    }

    pub fn stats(&self) -> StoreStats {
        let now = Utc::now();
        let active_urls = self
            .records
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count();

        StoreStats {
            total_urls: self.records.len(),
            active_urls,
            total_clicks: self.lifetime_clicks.load(Ordering::Relaxed),
            cache_size: self.cache.len(),
        }
    }
}
