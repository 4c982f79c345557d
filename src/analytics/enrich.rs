//! Click enrichment: turns raw request metadata into a `ClickEvent`.

use chrono::{DateTime, Utc};
use url::Url;
use woothee::parser::Parser;

use crate::analytics::geo;
use crate::analytics::models::{ClickEvent, ClickMetadata};

pub const UNKNOWN_IP: &str = "unknown";
pub const DIRECT_REFERRER: &str = "direct";
const OTHER_FAMILY: &str = "Other";

/// Parse a user-agent string into its browser family.
pub fn user_agent_family(user_agent: Option<&str>) -> String {
    let Some(ua) = user_agent else {
        return OTHER_FAMILY.to_string();
    };

    Parser::new()
        .parse(ua)
        .map(|result| result.name.to_string())
        .unwrap_or_else(|| OTHER_FAMILY.to_string())
}

/// Extract the host from a referrer URL. Absent or unparseable referrers
/// count as direct traffic.
pub fn referrer_host(referrer: Option<&str>) -> String {
    referrer
        .and_then(|r| Url::parse(r).ok())
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| DIRECT_REFERRER.to_string())
}

pub fn enrich_click(metadata: ClickMetadata, timestamp: DateTime<Utc>) -> ClickEvent {
    let client_ip = metadata
        .client_ip
        .unwrap_or_else(|| UNKNOWN_IP.to_string());
    let country = geo::country_for_ip(&client_ip);

    ClickEvent {
        timestamp,
        user_agent: user_agent_family(metadata.user_agent.as_deref()),
        referrer: referrer_host(metadata.referrer.as_deref()),
        country,
        client_ip,
    }
}
