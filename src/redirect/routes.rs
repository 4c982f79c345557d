use axum::{routing::get, Router};
use std::sync::Arc;

use crate::storage::UrlStore;

use super::handlers::{redirect_url, RedirectState};

pub fn create_redirect_router(store: Arc<UrlStore>) -> Router {
    let state = Arc::new(RedirectState { store });

    Router::new()
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
