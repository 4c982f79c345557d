//! JSON API integration tests
//!
//! Drives the /api router with `tower::ServiceExt::oneshot`: creation with
//! generated and custom codes, validation failures, listing, and stats.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use quicklink::api::{create_api_router, AppState};
use quicklink::generator::{CodeGenerator, GeneratorOptions};
use quicklink::storage::UrlStore;

const BASE_URL: &str = "http://sho.rt";

fn test_app() -> (Router, Arc<AppState>) {
    let store = Arc::new(UrlStore::with_defaults());
    let state = Arc::new(AppState {
        store,
        generator: CodeGenerator::new(),
        options: GeneratorOptions::default(),
        base_url: BASE_URL.to_string(),
        default_ttl_minutes: 30,
    });
    let app = Router::new().nest("/api", create_api_router(Arc::clone(&state)));
    (app, state)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn create_returns_full_envelope() {
    let (app, _) = test_app();

    let (status, body) = post_json(
        &app,
        "/api/urls",
        json!({"url": "https://example.com/page", "description": "landing page"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let code = body["shortcode"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(
        body["shortUrl"].as_str().unwrap(),
        format!("{BASE_URL}/{code}")
    );
    assert_eq!(body["originalUrl"], "https://example.com/page");
    assert_eq!(body["description"], "landing page");

    let created_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(body["createdAt"].clone()).unwrap();
    let expires_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(body["expiresAt"].clone()).unwrap();
    assert_eq!(expires_at - created_at, chrono::Duration::minutes(30));
}

#[tokio::test]
async fn custom_code_is_honored_then_conflicts() {
    let (app, _) = test_app();

    let (status, body) = post_json(
        &app,
        "/api/urls",
        json!({"url": "https://example.com", "shortcode": "my-code"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["shortcode"], "my-code");

    let (status, body) = post_json(
        &app,
        "/api/urls",
        json!({"url": "https://other.example", "shortcode": "my-code"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["field"], "shortcode");
}

#[tokio::test]
async fn create_rejects_malformed_input() {
    let (app, _) = test_app();

    let cases = [
        (json!({"url": ""}), "url"),
        (json!({"url": "not a url"}), "url"),
        (json!({"url": "ftp://example.com/file"}), "url"),
        (json!({"url": "https://x.com", "expiresIn": 0}), "expiresIn"),
        (
            json!({"url": "https://x.com", "expiresIn": 600000}),
            "expiresIn",
        ),
        (json!({"url": "https://x.com", "shortcode": "ab"}), "shortcode"),
        (
            json!({"url": "https://x.com", "shortcode": "bad code!"}),
            "shortcode",
        ),
        (json!({"url": "https://x.com", "shortcode": "api"}), "shortcode"),
    ];

    for (payload, field) in cases {
        let (status, body) = post_json(&app, "/api/urls", payload.clone()).await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "payload should be rejected: {payload}"
        );
        assert_eq!(body["field"], field, "wrong field for payload: {payload}");
    }
}

#[tokio::test]
async fn analytics_returns_404_for_unknown_or_expired() {
    let (app, state) = test_app();

    let (status, _) = get_json(&app, "/api/urls/nosuch").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    state.store.create("gone", "https://x.com", 0, None).unwrap();
    let (status, _) = get_json(&app, "/api/urls/gone").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analytics_envelope_for_fresh_record() {
    let (app, _) = test_app();

    let (_, created) = post_json(
        &app,
        "/api/urls",
        json!({"url": "https://example.com", "shortcode": "fresh1"}),
    )
    .await;
    assert_eq!(created["shortcode"], "fresh1");

    let (status, body) = get_json(&app, "/api/urls/fresh1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shortcode"], "fresh1");
    assert_eq!(body["originalUrl"], "https://example.com");
    assert_eq!(body["totalClicks"], 0);
    assert!(body["clicksByDay"].as_object().unwrap().is_empty());
    assert!(body["topReferers"].as_array().unwrap().is_empty());
    assert!(body["topCountries"].as_array().unwrap().is_empty());
    assert!(body["recentClicks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_paginates_newest_first() {
    let (app, _) = test_app();

    for code in ["old111", "mid222", "new333"] {
        let (status, _) = post_json(
            &app,
            "/api/urls",
            json!({"url": "https://example.com", "shortcode": code}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let (status, body) = get_json(&app, "/api/urls?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    let urls = body["urls"].as_array().unwrap();
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0]["shortCode"], "new333");
    assert_eq!(urls[1]["shortCode"], "mid222");

    let (_, body) = get_json(&app, "/api/urls?page=2&limit=2").await;
    let urls = body["urls"].as_array().unwrap();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0]["shortCode"], "old111");
}

#[tokio::test]
async fn list_limit_is_capped() {
    let (app, _) = test_app();

    let (status, body) = get_json(&app, "/api/urls?limit=5000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 100);
}

#[tokio::test]
async fn stats_reports_service_counters() {
    let (app, state) = test_app();

    for code in ["st1", "st2"] {
        post_json(
            &app,
            "/api/urls",
            json!({"url": "https://example.com", "shortcode": code}),
        )
        .await;
    }
    state
        .store
        .record_click("st1", quicklink::analytics::ClickMetadata::default());

    let (status, body) = get_json(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUrls"], 2);
    assert_eq!(body["activeUrls"], 2);
    assert_eq!(body["totalClicks"], 1);
    assert_eq!(body["cacheSize"], 0);
    // 62^6 for the full charset at the default length
    assert_eq!(body["codeSpaceSize"], 56_800_235_584u64);
}
