use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use quicklink::api::{self, handlers::health_check, AppState};
use quicklink::config::Config;
use quicklink::generator::{CodeGenerator, GeneratorOptions, DEFAULT_MAX_ATTEMPTS};
use quicklink::redirect;
use quicklink::storage::UrlStore;
use quicklink::sweeper::ExpirySweeper;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize the in-memory store; everything is process-lifetime only
    let store = Arc::new(UrlStore::new(
        config.store.cache_capacity,
        config.store.hot_threshold,
    ));

    // Start the background expiry sweeper
    let sweeper = ExpirySweeper::start(
        Arc::clone(&store),
        Duration::from_secs(config.store.sweep_interval_secs),
    );
    info!(
        "Expiry sweeper running every {}s",
        config.store.sweep_interval_secs
    );

    let state = Arc::new(AppState {
        store: Arc::clone(&store),
        generator: CodeGenerator::new(),
        options: GeneratorOptions {
            length: config.shortening.code_length,
            strategy: config.shortening.strategy,
            charset: config.shortening.charset,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        },
        base_url: config.server.base_url.clone(),
        default_ttl_minutes: config.shortening.default_ttl_minutes,
    });

    // Compose routers: JSON API under /api, redirects at the root
    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api::create_api_router(Arc::clone(&state)))
        .merge(redirect::create_redirect_router(Arc::clone(&store)));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 quicklink listening on http://{}", addr);
    info!("   - API endpoints available at http://{}/api/...", addr);
    info!("   - Short links served from http://{}/{{code}}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await;

    // Let any in-progress sweep finish before the process exits
    sweeper.stop();
    sweeper.join().await;

    Ok(served?)
}
