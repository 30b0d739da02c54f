#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use artweeks_api::auth::JwksVerifier;
use artweeks_api::config::ServerConfig;
use artweeks_api::router::build_app_router;
use artweeks_api::state::AppState;
use artweeks_db::Store;
use artweeks_discord::Notifier;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use http_body_util::BodyExt;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SIGNING_SECRET: &[u8] = b"test-signing-secret-for-artweeks-0001";
pub const ISSUER: &str = "https://auth.artweeks.test/";
pub const AUDIENCE: &str = "artweeks-api";
pub const KEY_ID: &str = "test-key";

pub const STAFF_ID: &str = "900000000000000001";
pub const ARTIST_ID: &str = "100000000000000001";
pub const OTHER_ID: &str = "100000000000000002";

/// Build a test `ServerConfig` with safe defaults and one staff member.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        expose_error_details: false,
        staff_ids: HashSet::from([STAFF_ID.to_string()]),
        reconcile_interval_secs: 0,
        auth: None,
    }
}

/// Verifier over a symmetric `oct` key, so tests can mint HS256 tokens.
pub fn test_verifier() -> JwksVerifier {
    let set: JwkSet = serde_json::from_value(json!({
        "keys": [{
            "kty": "oct",
            "kid": KEY_ID,
            "alg": "HS256",
            "k": URL_SAFE_NO_PAD.encode(SIGNING_SECRET),
        }]
    }))
    .unwrap();
    JwksVerifier::from_jwk_set(set, ISSUER, AUDIENCE, vec![Algorithm::HS256])
}

pub fn test_state(store: Option<Store>) -> AppState {
    AppState {
        store,
        config: Arc::new(test_config()),
        verifier: Some(Arc::new(test_verifier())),
        notifier: Arc::new(Notifier::disabled()),
        uploader: None,
        previews: None,
    }
}

/// Full router over a fresh in-memory store. The store handle is returned
/// so tests can seed or inspect it directly.
pub fn build_test_app() -> (Router, Store) {
    let store = Store::memory();
    let app = build_app_router(test_state(Some(store.clone())), &test_config());
    (app, store)
}

/// Full router over a fresh in-memory store, announcing through `notifier`.
pub fn build_app_with_notifier(notifier: Notifier) -> (Router, Store) {
    let store = Store::memory();
    let mut state = test_state(Some(store.clone()));
    state.notifier = Arc::new(notifier);
    (build_app_router(state, &test_config()), store)
}

/// Full router with no store bound.
pub fn build_unbound_app() -> Router {
    build_app_router(test_state(None), &test_config())
}

/// HS256 token for a Discord id, valid for an hour.
pub fn token_for(discord_id: &str) -> String {
    sign(json!({
        "sub": format!("oauth2|discord|{discord_id}"),
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": chrono::Utc::now().timestamp() + 3600,
    }))
}

/// Token that expired an hour ago.
pub fn expired_token_for(discord_id: &str) -> String {
    sign(json!({
        "sub": format!("oauth2|discord|{discord_id}"),
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": chrono::Utc::now().timestamp() - 3600,
    }))
}

fn sign(claims: Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KEY_ID.to_string());
    encode(&header, &claims, &EncodingKey::from_secret(SIGNING_SECRET)).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn put_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::DELETE, uri, token, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn week_json(week: u32, theme: &str, published: bool) -> Value {
    json!({
        "year": 2024,
        "week": week,
        "theme": theme,
        "information": format!("About {theme}"),
        "isPublished": published,
    })
}

/// Seed weeks 1-4 of 2024 as staff; week 4 stays unpublished.
pub async fn seed_weeks(app: &Router) {
    let staff = token_for(STAFF_ID);
    let response = put_json(
        app,
        "/weeks",
        Some(&staff),
        json!([
            week_json(1, "Water", true),
            week_json(2, "Fire", true),
            week_json(3, "Earth", true),
            week_json(4, "Air", false),
        ]),
    )
    .await;
    assert_eq!(response.status(), 200);
}

pub async fn create_artist(app: &Router, discord_id: &str, name: &str) {
    let response = put_json(
        app,
        "/artist",
        Some(&token_for(discord_id)),
        json!({ "name": name, "socials": [] }),
    )
    .await;
    assert_eq!(response.status(), 200, "profile for {name}");
}

pub fn work_json(title: &str, weeks: &[u32], url: &str) -> Value {
    json!({
        "year": 2024,
        "weekNumbers": weeks,
        "title": title,
        "medium": "ink",
        "description": "",
        "items": [{ "url": url }],
    })
}

/// Submit a work as `discord_id` and return the stored record.
pub async fn submit_work(app: &Router, discord_id: &str, body: Value) -> Value {
    let response = put_json(app, "/work", Some(&token_for(discord_id)), body).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"].clone()
}
