use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers::{
    create_url, get_url_analytics, health_check, list_urls, service_stats, AppState,
};

pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/urls", post(create_url).get(list_urls))
        .route("/urls/{code}", get(get_url_analytics))
        .route("/stats", get(service_stats))
        .route("/health", get(health_check))
        .with_state(state)
}
