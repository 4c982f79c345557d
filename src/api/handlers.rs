use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::{summarize, AggregateSummary};
use crate::generator::{is_valid_code, CodeGenerator, GeneratorOptions};
use crate::models::{CreateUrlRequest, UrlRecord};
use crate::storage::{StoreError, UrlStore};

/// Route words that can never be claimed as custom codes.
const RESERVED_CODES: &[&str] = &["api", "health", "stats", "admin", "www"];

/// One year, in minutes.
const MAX_TTL_MINUTES: i64 = 525_600;

const MAX_LIST_LIMIT: usize = 100;

pub struct AppState {
    pub store: Arc<UrlStore>,
    pub generator: CodeGenerator,
    pub options: GeneratorOptions,
    pub base_url: String,
    pub default_ttl_minutes: i64,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlResponse {
    pub shortcode: String,
    pub short_url: String,
    pub original_url: String,
    pub description: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub shortcode: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: AggregateSummary,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    50
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub urls: Vec<UrlRecord>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_urls: usize,
    pub active_urls: usize,
    pub total_clicks: u64,
    pub cache_size: usize,
    /// Theoretical number of distinct codes at the default length of 6.
    pub code_space_size: u64,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn validation_error(field: &str, message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            field: Some(field.to_string()),
        }),
    )
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            field: None,
        }),
    )
}

fn conflict() -> ApiError {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse {
            error: "Short code already exists".to_string(),
            field: Some("shortcode".to_string()),
        }),
    )
}

/// Log the cause under a correlation id; the wire gets a generic body.
fn internal_error<E: std::fmt::Display>(err: E) -> ApiError {
    let correlation_id = format!("{:016x}", rand::rng().random::<u64>());
    tracing::error!(%correlation_id, error = %err, "internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            field: None,
        }),
    )
}

fn validate_target_url(raw: &str) -> Result<(), ApiError> {
    if raw.is_empty() {
        return Err(validation_error("url", "URL cannot be empty"));
    }

    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(validation_error("url", "URL must use http or https")),
        Err(_) => Err(validation_error("url", "URL is not valid")),
    }
}

fn validate_custom_code(code: &str) -> Result<(), ApiError> {
    if !is_valid_code(code) {
        return Err(validation_error(
            "shortcode",
            "Custom code must be 3-20 characters of letters, digits, '_' or '-'",
        ));
    }
    if RESERVED_CODES.contains(&code.to_ascii_lowercase().as_str()) {
        return Err(validation_error("shortcode", "Custom code is reserved"));
    }
    Ok(())
}

/// Create a new shortened URL
pub async fn create_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), ApiError> {
    validate_target_url(&payload.url)?;

    let ttl_minutes = payload.expires_in.unwrap_or(state.default_ttl_minutes);
    if !(1..=MAX_TTL_MINUTES).contains(&ttl_minutes) {
        return Err(validation_error(
            "expiresIn",
            "expiresIn must be between 1 and 525600 minutes",
        ));
    }

    let custom = payload.shortcode.is_some();
    let short_code = match payload.shortcode {
        Some(code) => {
            validate_custom_code(&code)?;
            if state.store.exists(&code) {
                return Err(conflict());
            }
            code
        }
        None => state
            .generator
            .generate(&payload.url, &state.options, |code| state.store.exists(code)),
    };

    match state
        .store
        .create(&short_code, &payload.url, ttl_minutes, payload.description)
    {
        Ok(record) => Ok((
            StatusCode::CREATED,
            Json(CreateUrlResponse {
                short_url: format!("{}/{}", state.base_url.trim_end_matches('/'), record.short_code),
                shortcode: record.short_code,
                original_url: record.original_url,
                description: record.description,
                expires_at: record.expires_at,
                created_at: record.created_at,
            }),
        )),
        // Lost a race for the code: a caller-supplied code is a plain
        // conflict, a generated one means the pre-checked draw went stale.
        Err(StoreError::Conflict) if custom => Err(conflict()),
        Err(err) => Err(internal_error(err)),
    }
}

/// Usage analytics for one short code
pub async fn get_url_analytics(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let Some(record) = state.store.get(&code) else {
        return Err(not_found("URL not found"));
    };

    let events = state.store.events(&code).unwrap_or_default();
    let summary = summarize(&record, &events);

    Ok(Json(AnalyticsResponse {
        shortcode: record.short_code.clone(),
        original_url: record.original_url.clone(),
        created_at: record.created_at,
        expires_at: record.expires_at,
        summary,
    }))
}

/// List live URLs, most recently created first
pub async fn list_urls(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, MAX_LIST_LIMIT);

    let (urls, total) = state.store.list(page, limit);
    Json(ListResponse {
        urls,
        page,
        limit,
        total,
    })
}

/// Aggregate service counters
pub async fn service_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.store.stats();
    let code_space_size = (state.options.charset.len() as u64).pow(6);

    Json(StatsResponse {
        total_urls: stats.total_urls,
        active_urls: stats.active_urls,
        total_clicks: stats.total_clicks,
        cache_size: stats.cache_size,
        code_space_size,
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
