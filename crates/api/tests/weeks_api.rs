mod common;

use std::time::Duration;

use artweeks_db::keys;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{
    body_json, build_test_app, expired_token_for, get, put_json, seed_weeks, token_for, week_json,
    ARTIST_ID, STAFF_ID,
};

#[tokio::test]
async fn anonymous_callers_see_published_weeks_only() {
    let (app, _store) = build_test_app();
    seed_weeks(&app).await;

    let json = body_json(get(&app, "/weeks", None).await).await;
    let weeks = json["data"].as_array().unwrap();
    assert_eq!(weeks.len(), 3);
    assert!(weeks.iter().all(|w| w["isPublished"] == true));
    assert_eq!(weeks[0]["theme"], "Water");
}

#[tokio::test]
async fn staff_see_every_week_in_order() {
    let (app, _store) = build_test_app();
    seed_weeks(&app).await;

    let staff = token_for(STAFF_ID);
    let json = body_json(get(&app, "/weeks", Some(&staff)).await).await;
    let numbers: Vec<u64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["week"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn put_replaces_the_whole_set() {
    let (app, _store) = build_test_app();
    seed_weeks(&app).await;

    let staff = token_for(STAFF_ID);
    let response = put_json(&app, "/weeks", Some(&staff), json!([week_json(7, "Metal", true)])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(&app, "/weeks", Some(&staff)).await).await;
    let weeks = json["data"].as_array().unwrap();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0]["theme"], "Metal");
}

#[tokio::test]
async fn anonymous_write_is_unauthorized() {
    let (app, _store) = build_test_app();
    let response = put_json(&app, "/weeks", None, json!([week_json(1, "Water", true)])).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn non_staff_write_is_forbidden() {
    let (app, _store) = build_test_app();
    let token = token_for(ARTIST_ID);
    let response = put_json(&app, "/weeks", Some(&token), json!([week_json(1, "Water", true)])).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn invalid_token_is_treated_as_anonymous() {
    let (app, _store) = build_test_app();
    seed_weeks(&app).await;

    // Reads still work, without staff visibility.
    let expired = expired_token_for(STAFF_ID);
    let json = body_json(get(&app, "/weeks", Some(&expired)).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    // Writes need a verified caller.
    let response = put_json(&app, "/weeks", Some("garbage"), json!([])).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn field_errors_are_listed_per_week() {
    let (app, _store) = build_test_app();
    let staff = token_for(STAFF_ID);
    let response = put_json(
        &app,
        "/weeks",
        Some(&staff),
        json!([week_json(1, "Water", true), week_json(17, "", true)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let details: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    assert_eq!(details.len(), 2);
    assert!(details.iter().any(|d| d.starts_with("[1].week")), "{details:?}");
    assert!(details.iter().any(|d| d.starts_with("[1].theme")), "{details:?}");
}

#[tokio::test]
async fn duplicate_weeks_are_rejected() {
    let (app, _store) = build_test_app();
    let staff = token_for(STAFF_ID);
    let response = put_json(
        &app,
        "/weeks",
        Some(&staff),
        json!([week_json(2, "Fire", true), week_json(2, "Ice", true)]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (app, _store) = build_test_app();
    let staff = token_for(STAFF_ID);
    let response = put_json(&app, "/weeks", Some(&staff), json!({ "not": "a list" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn lowercase_bearer_scheme_is_accepted() {
    let (app, _store) = build_test_app();
    seed_weeks(&app).await;

    let request = Request::builder()
        .uri("/weeks")
        .header("authorization", format!("bearer {}", token_for(STAFF_ID)))
        .body(Body::empty())
        .unwrap();
    let json = body_json(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn message_ids_are_carried_over_under_the_writer_lock() {
    let (app, store) = build_test_app();
    seed_weeks(&app).await;

    let guard = store.lock_writes().await;
    let pending = tokio::spawn({
        let app = app.clone();
        async move {
            let staff = token_for(STAFF_ID);
            body_json(put_json(&app, "/weeks", Some(&staff), json!([week_json(1, "Water", true)])).await)
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    // An announcement id lands while the replacement waits for the lock.
    let mut stored: Vec<Value> = store.get_json(keys::WEEKS).await.unwrap().unwrap();
    stored[0]["discordId"] = json!("m1");
    store.put_json(keys::WEEKS, &stored).await.unwrap();
    drop(guard);

    let json = pending.await.unwrap();
    assert_eq!(json["data"][0]["discordId"], "m1");
}
