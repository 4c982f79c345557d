use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub short_code: String,
    pub original_url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub clicks: u64,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl UrlRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    pub url: String,
    pub shortcode: Option<String>,
    /// Minutes until expiry. Falls back to the configured default when absent.
    pub expires_in: Option<i64>,
    pub description: Option<String>,
}
