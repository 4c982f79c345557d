use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{
        header::{self, HeaderMap},
        StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::ClickMetadata;
use crate::storage::UrlStore;

pub struct RedirectState {
    pub store: Arc<UrlStore>,
}

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    /// `track=false` suppresses the UTM rewrite of the target URL.
    pub track: Option<bool>,
}

/// Redirect to the original URL, counting the click as a side effect.
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    Query(query): Query<RedirectQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let Some(record) = state.store.get(&code) else {
        return not_found_page();
    };

    let metadata = click_metadata(&headers, addr);
    if !state.store.record_click(&code, metadata) {
        // Swept between lookup and click; the redirect still goes through.
        tracing::warn!(short_code = %code, "click not recorded for vanished record");
    }

    let location = if query.track.unwrap_or(true) {
        with_tracking_params(&record.original_url, &code)
    } else {
        record.original_url.clone()
    };

    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Append the fixed UTM triplet, campaign keyed by the short code.
fn with_tracking_params(original_url: &str, code: &str) -> String {
    let separator = if original_url.contains('?') { '&' } else { '?' };
    format!(
        "{original_url}{separator}utm_source=quicklink&utm_medium=shorturl&utm_campaign={code}"
    )
}

fn click_metadata(headers: &HeaderMap, addr: SocketAddr) -> ClickMetadata {
    // First hop of X-Forwarded-For when present, socket address otherwise.
    let forwarded_ip = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    ClickMetadata {
        client_ip: forwarded_ip.or_else(|| Some(addr.ip().to_string())),
        user_agent: header_string(headers, header::USER_AGENT),
        referrer: header_string(headers, header::REFERER),
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn not_found_page() -> Response {
    let body = Html(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>404 - Link not found</title></head>\n\
         <body>\n\
         <h1>404</h1>\n\
         <p>This short link does not exist or has expired.</p>\n\
         </body>\n\
         </html>",
    );
    (StatusCode::NOT_FOUND, body).into_response()
}
