//! Data models for analytics

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded redirect, enriched at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,

    /// Client address, or `"unknown"` when none was observable.
    pub client_ip: String,

    /// Parsed user-agent family (e.g. "Chrome", "Firefox", "Other").
    pub user_agent: String,

    /// Referrer host, or `"direct"`.
    pub referrer: String,

    /// Country derived from the static lookup table.
    pub country: String,
}

/// Raw request metadata captured on the redirect path, before enrichment.
#[derive(Debug, Clone, Default)]
pub struct ClickMetadata {
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// One entry of a descending top-N count list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountEntry {
    pub name: String,
    pub count: u64,
}

/// Derived usage summary for one short code. Regenerated on every query,
/// never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    pub total_clicks: u64,

    /// Clicks grouped by calendar day (`YYYY-MM-DD`), ascending by day.
    pub clicks_by_day: BTreeMap<String, u64>,

    /// Top 5 referrer hosts by count.
    pub top_referers: Vec<CountEntry>,

    /// Top 5 countries by count.
    pub top_countries: Vec<CountEntry>,

    /// The 10 most recent events, in insertion order.
    pub recent_clicks: Vec<ClickEvent>,
}
