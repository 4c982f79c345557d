//! Per-code usage analytics: click enrichment and on-demand aggregation.

pub mod enrich;
pub mod geo;
pub mod models;
pub mod summary;

pub use enrich::enrich_click;
pub use models::{AggregateSummary, ClickEvent, ClickMetadata, CountEntry};
pub use summary::summarize;
