pub mod cache;
pub mod store;

pub use cache::{HotCache, DEFAULT_CACHE_CAPACITY};
pub use store::{StoreError, StoreResult, StoreStats, UrlStore, DEFAULT_HOT_THRESHOLD};
