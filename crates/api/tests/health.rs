mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use common::{body_json, build_test_app, build_unbound_app, get};

#[tokio::test]
async fn health_reports_memory_backend() {
    let (app, _store) = build_test_app();
    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storeBackend"], "memory");
    assert_eq!(json["storeHealthy"], true);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn health_is_degraded_without_a_store() {
    let app = build_unbound_app();
    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert!(json["storeBackend"].is_null());
    assert_eq!(json["storeHealthy"], false);
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let (app, _store) = build_test_app();
    let response = get(&app, "/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "Not Found");
    assert_eq!(json["details"], "No route for GET /nope");
    assert!(json["_original"].is_null());
}

#[tokio::test]
async fn unrouted_methods_get_the_json_404() {
    let (app, _store) = build_test_app();
    for (method, uri) in [
        (Method::POST, "/weeks"),
        (Method::PATCH, "/work"),
        (Method::DELETE, "/artists"),
    ] {
        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");

        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["details"], format!("No route for {method} {uri}"));
    }
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (app, _store) = build_test_app();
    let response = get(&app, "/health", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn incoming_request_id_is_propagated() {
    let (app, _store) = build_test_app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let (app, _store) = build_test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/work")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "PUT")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}
