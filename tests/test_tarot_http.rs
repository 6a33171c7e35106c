//! `/tarot/draw` and page routes driven through the router.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tower::ServiceExt;

use arcana_relay::config::AuthConfig;
use arcana_relay::server::{AppState, build_router};
use arcana_relay::tarot::{DrawEngine, build_deck};

fn router(auth: AuthConfig) -> Router {
    build_router(AppState::new(DrawEngine::new(), None, auth))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let resp = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn positions(body: &Value) -> Vec<&str> {
    body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["position"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn default_draw_is_one_single_card() {
    let (status, body) = get(router(AuthConfig::disabled()), "/tarot/draw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["spread"], "single");
    assert_eq!(body["count"], 1);
    let card = &body["cards"][0];
    assert_eq!(card["position"], "1");
    assert!(build_deck().contains(&card["card"].as_str().unwrap().to_string()));
    assert!(!card["meaning"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn single_draw_numbers_positions_and_has_unique_cards() {
    let (status, body) = get(router(AuthConfig::disabled()), "/tarot/draw?count=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert_eq!(positions(&body), vec!["1", "2", "3", "4", "5"]);

    let mut names: Vec<&str> =
        body["cards"].as_array().unwrap().iter().map(|c| c["card"].as_str().unwrap()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 5);
}

#[tokio::test]
async fn three_spread_ignores_count() {
    let (status, body) = get(router(AuthConfig::disabled()), "/tarot/draw?spread=three&count=9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["spread"], "three");
    assert_eq!(body["count"], 3);
    assert_eq!(positions(&body), vec!["Past", "Present", "Future"]);
}

#[tokio::test]
async fn cross_spread_has_ten_labelled_cards() {
    let (status, body) = get(router(AuthConfig::disabled()), "/tarot/draw?spread=CROSS").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["spread"], "CROSS");
    assert_eq!(body["count"], 10);
    let labels = positions(&body);
    assert_eq!(labels.first(), Some(&"Significator"));
    assert_eq!(labels.last(), Some(&"Outcome"));
}

#[tokio::test]
async fn out_of_range_counts_are_bad_requests() {
    for (uri, detail) in [
        ("/tarot/draw?count=0", "count must be >= 1"),
        ("/tarot/draw?count=-3", "count must be >= 1"),
        ("/tarot/draw?count=79", "count must be <= 78"),
    ] {
        let (status, body) = get(router(AuthConfig::disabled()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["detail"], detail, "{uri}");
    }
}

#[tokio::test]
async fn non_integer_count_is_a_json_bad_request() {
    let resp = router(AuthConfig::disabled())
        .oneshot(Request::get("/tarot/draw?count=abc").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["detail"], "count must be an integer, got 'abc'");
}

#[tokio::test]
async fn fixed_spread_ignores_malformed_count() {
    for uri in ["/tarot/draw?spread=three&count=", "/tarot/draw?spread=three&count=abc"] {
        let (status, body) = get(router(AuthConfig::disabled()), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["count"], 3, "{uri}");
    }
}

#[tokio::test]
async fn blank_count_on_single_spread_draws_one_card() {
    let (status, body) = get(router(AuthConfig::disabled()), "/tarot/draw?spread=single&count=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn padded_spread_name_is_rejected() {
    let (status, body) = get(router(AuthConfig::disabled()), "/tarot/draw?spread=three%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("'three '"));
}

#[tokio::test]
async fn unknown_spread_is_a_bad_request_naming_valid_values() {
    let (status, body) = get(router(AuthConfig::disabled()), "/tarot/draw?spread=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("bogus"));
    for name in ["single", "three", "cross"] {
        assert!(detail.contains(name));
    }
}

#[tokio::test]
async fn root_redirects_to_tarot_page() {
    let resp = router(AuthConfig::disabled())
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[header::LOCATION], "/tarot");
}

#[tokio::test]
async fn tarot_page_is_html() {
    let resp = router(AuthConfig::disabled())
        .oneshot(Request::get("/tarot").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(ct.starts_with("text/html"));
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/tarot/draw"));
}

// ── auth ──────────────────────────────────────────────────────────────────────

fn guarded() -> AuthConfig {
    AuthConfig::from_credentials(Some("reader".into()), Some("hunter2".into()))
}

#[tokio::test]
async fn tarot_page_requires_credentials_when_configured() {
    let resp = router(guarded())
        .oneshot(Request::get("/tarot").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Basic");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn tarot_page_accepts_valid_credentials() {
    let token = STANDARD.encode("reader:hunter2");
    let resp = router(guarded())
        .oneshot(
            Request::get("/tarot")
                .header(header::AUTHORIZATION, format!("Basic {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn draw_endpoint_stays_open_under_auth() {
    let (status, body) = get(router(guarded()), "/tarot/draw?spread=three").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
}
