//! HTTP contract tests for the view layer.
//!
//! These exercise the router with a lazy database pool: every request
//! here is rejected by payload parsing, schema validation or the auth
//! boundary before any query would run, so no database is needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use annostore_server::config::ServerConfig;
use annostore_server::routes::build_router;
use annostore_server::state::AppState;
use annostore_store::Store;

const DEV_AUTH_HEADER: &str = "X-Annotator-Auth-Token";
const TEST_USERID: &str = "acct:tester@example.com";

fn test_app(allow_dev_identity: bool) -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/annostore_test")
        .expect("lazy pool");
    let store = Store::from_pool(pool);

    let config = ServerConfig {
        port: 0,
        log_level: "info".into(),
        cors_allowed_origins: "*".into(),
        public_url: "http://api.example.com".into(),
        html_url: "http://example.com".into(),
        incontext_url: None,
        jwt_public_key: String::new(),
        allow_dev_identity,
        default_group: "__world__".into(),
    };

    build_router(AppState::new(store, config))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn malformed_payload_yields_fixed_envelope() {
    let app = test_app(true);

    let response = app
        .oneshot(
            Request::post("/annotations")
                .header("content-type", "application/json")
                .header(DEV_AUTH_HEADER, TEST_USERID)
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert_eq!(
        body["reason"],
        "Expected a valid JSON payload, but none was found!"
    );
}

#[tokio::test]
async fn empty_body_yields_fixed_envelope() {
    let app = test_app(true);

    let response = app
        .oneshot(
            Request::post("/annotations")
                .header(DEV_AUTH_HEADER, TEST_USERID)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["reason"],
        "Expected a valid JSON payload, but none was found!"
    );
}

#[tokio::test]
async fn missing_uri_yields_validation_envelope() {
    let app = test_app(true);

    let response = app
        .oneshot(
            Request::post("/annotations")
                .header("content-type", "application/json")
                .header(DEV_AUTH_HEADER, TEST_USERID)
                .body(Body::from(r#"{"text": "no uri here"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert_eq!(body["reason"], "uri: 'uri' is a required property");
}

#[tokio::test]
async fn create_without_identity_is_unauthorized() {
    let app = test_app(false);

    let response = app
        .oneshot(
            Request::post("/annotations")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"uri": "http://example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert_eq!(
        body["reason"],
        "unauthorized: Missing Authorization: Bearer <jwt> header"
    );
}

#[tokio::test]
async fn dev_identity_rejected_when_disabled() {
    let app = test_app(false);

    let response = app
        .oneshot(
            Request::post("/annotations")
                .header(DEV_AUTH_HEADER, TEST_USERID)
                .body(Body::from(r#"{"uri": "http://example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_uuid_annotation_id_is_not_found() {
    let app = test_app(true);

    let response = app
        .oneshot(
            Request::get("/annotations/not-a-uuid")
                .header(DEV_AUTH_HEADER, TEST_USERID)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert_eq!(body["reason"], "not found: annotation id is not a valid UUID");
}

#[tokio::test]
async fn malformed_search_params_use_the_failure_envelope() {
    let app = test_app(true);

    let response = app
        .oneshot(
            Request::get("/search?limit=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failure");
    assert!(body["reason"].is_string());
}

#[tokio::test]
async fn index_describes_the_api() {
    let app = test_app(true);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Annotator Store API");
    assert_eq!(
        body["links"]["annotation"]["create"]["url"],
        "http://api.example.com/annotations"
    );
    assert_eq!(
        body["links"]["annotation"]["read"]["url"],
        "http://api.example.com/annotations/:id"
    );
    assert_eq!(
        body["links"]["search"]["url"],
        "http://api.example.com/search"
    );
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app(true);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "annostore");
}
