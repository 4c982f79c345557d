//! On-demand aggregation over a record's event log.

use std::collections::{BTreeMap, HashMap};

use crate::analytics::models::{AggregateSummary, ClickEvent, CountEntry};
use crate::models::UrlRecord;

pub const TOP_ENTRIES: usize = 5;
pub const RECENT_EVENTS: usize = 10;

/// Build the usage summary for one record from a snapshot of its event log.
///
/// Pure over its inputs; the caller fetches the snapshot and nothing here is
/// memoized. `events` is expected in insertion (chronological) order, which
/// is how the store keeps its ring buffers.
pub fn summarize(record: &UrlRecord, events: &[ClickEvent]) -> AggregateSummary {
    let mut by_day: BTreeMap<String, u64> = BTreeMap::new();
    let mut referrers: HashMap<String, u64> = HashMap::new();
    let mut countries: HashMap<String, u64> = HashMap::new();

    for event in events {
        let day = event.timestamp.date_naive().format("%Y-%m-%d").to_string();
        *by_day.entry(day).or_insert(0) += 1;
        *referrers.entry(event.referrer.clone()).or_insert(0) += 1;
        *countries.entry(event.country.clone()).or_insert(0) += 1;
    }

    let recent_start = events.len().saturating_sub(RECENT_EVENTS);

    AggregateSummary {
        total_clicks: record.clicks,
        clicks_by_day: by_day,
        top_referers: top_entries(referrers),
        top_countries: top_entries(countries),
        recent_clicks: events[recent_start..].to_vec(),
    }
}

/// Descending by count, ties broken lexically so summaries are deterministic.
fn top_entries(counts: HashMap<String, u64>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(name, count)| CountEntry { name, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries.truncate(TOP_ENTRIES);
    entries
}
