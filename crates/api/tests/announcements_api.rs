//! Discord announcements against a local stand-in for the webhook API.
//!
//! The stand-in records every call, answers `POST` with a fresh message id,
//! and can be told to fail a number of upcoming calls with 503.

mod common;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use artweeks_db::models::week::Week;
use artweeks_db::repositories::{WeekRepo, WorkRepo};
use artweeks_db::Store;
use artweeks_discord::{DiscordConfig, Notifier};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use common::{
    build_app_with_notifier, create_artist, post_json, put_json, seed_weeks, submit_work,
    token_for, week_json, work_json, ARTIST_ID, STAFF_ID,
};

// ---------------------------------------------------------------------------
// Webhook stand-in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Call {
    method: Method,
    path: String,
    query: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct FakeDiscord {
    calls: Arc<Mutex<Vec<Call>>>,
    next_id: Arc<AtomicU64>,
    failures: Arc<AtomicUsize>,
}

impl FakeDiscord {
    /// Serve on an ephemeral port and return a notifier pointed at it.
    async fn start(&self) -> Notifier {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(record).with_state(self.clone());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Notifier::new(&DiscordConfig {
            weeks_webhook_url: Some(format!("http://{addr}/hooks/weeks")),
            works_webhook_url: Some(format!("http://{addr}/hooks/works")),
            site_url: "http://localhost:5173".to_string(),
        })
        .unwrap()
    }

    fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    fn calls_to(&self, channel: &str) -> Vec<Call> {
        let prefix = format!("/hooks/{channel}");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path.starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Wait until `channel` has received at least `count` calls.
    async fn wait_for_calls(&self, channel: &str, count: usize) -> Vec<Call> {
        for _ in 0..100 {
            let calls = self.calls_to(channel);
            if calls.len() >= count {
                return calls;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("expected {count} calls to {channel}, got {:?}", self.calls_to(channel));
    }
}

async fn record(
    State(discord): State<FakeDiscord>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    discord.calls.lock().unwrap().push(Call {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let failing = discord
        .failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if method == Method::POST {
        let id = discord.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        return Json(json!({ "id": format!("msg-{id}") })).into_response();
    }
    Json(json!({})).into_response()
}

// ---------------------------------------------------------------------------
// Store polling
// ---------------------------------------------------------------------------

/// Wait until every published week carries a message id.
async fn announced_weeks(store: &Store) -> Vec<Week> {
    for _ in 0..100 {
        let weeks = WeekRepo::list(store).await.unwrap();
        if weeks.iter().filter(|w| w.is_published).all(|w| w.discord_id.is_some()) {
            return weeks;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("published weeks were never announced");
}

async fn work_message_id(store: &Store, id: &str) -> String {
    for _ in 0..100 {
        let work = WorkRepo::find_by_id(store, id).await.unwrap().unwrap();
        if let Some(message_id) = work.discord_id {
            return message_id;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("work {id} was never announced");
}

/// Seed weeks, a profile, and one submitted work; returns the work id.
async fn submitted_work(app: &Router, store: &Store) -> String {
    seed_weeks(app).await;
    announced_weeks(store).await;
    create_artist(app, ARTIST_ID, "Moonpie").await;
    let work = submit_work(app, ARTIST_ID, work_json("Tide", &[1], "https://cdn.example/a.png")).await;
    work["id"].as_str().unwrap().to_string()
}

async fn approve(app: &Router, id: &str) -> Value {
    let staff = token_for(STAFF_ID);
    let response = post_json(app, "/approve", Some(&staff), json!({ "id": id })).await;
    assert_eq!(response.status(), StatusCode::OK);
    common::body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Weeks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn published_weeks_are_posted_and_their_ids_stored() {
    let discord = FakeDiscord::default();
    let (app, store) = build_app_with_notifier(discord.start().await);
    seed_weeks(&app).await;

    let weeks = announced_weeks(&store).await;
    let calls = discord.calls_to("weeks");
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.method == Method::POST));
    assert!(calls.iter().all(|c| c.query.as_deref() == Some("wait=true")));

    let ids: Vec<Option<&str>> = weeks.iter().map(|w| w.discord_id.as_deref()).collect();
    assert_eq!(ids, vec![Some("msg-1"), Some("msg-2"), Some("msg-3"), None]);
}

#[tokio::test]
async fn only_changed_weeks_are_announced_again() {
    let discord = FakeDiscord::default();
    let (app, store) = build_app_with_notifier(discord.start().await);
    seed_weeks(&app).await;
    let before = announced_weeks(&store).await;

    let staff = token_for(STAFF_ID);
    let response = put_json(
        &app,
        "/weeks",
        Some(&staff),
        json!([
            week_json(1, "Water", true),
            week_json(2, "Lava", true),
            week_json(3, "Earth", true),
            week_json(4, "Air", false),
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = discord.wait_for_calls("weeks", 4).await;
    let edit = &calls[3];
    assert_eq!(edit.method, Method::PATCH);
    assert_eq!(edit.path, format!("/hooks/weeks/messages/{}", before[1].discord_id.as_deref().unwrap()));
    assert_eq!(edit.body["embeds"][0]["title"], "Lava");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(discord.calls_to("weeks").len(), 4);
    assert_eq!(WeekRepo::list(&store).await.unwrap()[1].discord_id, before[1].discord_id);
}

#[tokio::test]
async fn newly_published_week_is_posted() {
    let discord = FakeDiscord::default();
    let (app, store) = build_app_with_notifier(discord.start().await);
    seed_weeks(&app).await;
    announced_weeks(&store).await;

    let staff = token_for(STAFF_ID);
    let response = put_json(
        &app,
        "/weeks",
        Some(&staff),
        json!([
            week_json(1, "Water", true),
            week_json(2, "Fire", true),
            week_json(3, "Earth", true),
            week_json(4, "Air", true),
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let weeks = announced_weeks(&store).await;
    assert_eq!(weeks[3].discord_id.as_deref(), Some("msg-4"));
    assert_eq!(discord.calls_to("weeks").len(), 4);
}

// ---------------------------------------------------------------------------
// Works
// ---------------------------------------------------------------------------

#[tokio::test]
async fn approval_posts_the_work_and_stores_its_message_id() {
    let discord = FakeDiscord::default();
    let (app, store) = build_app_with_notifier(discord.start().await);
    let id = submitted_work(&app, &store).await;

    let approved = approve(&app, &id).await;
    assert_eq!(approved["isApproved"], true);

    let message_id = work_message_id(&store, &id).await;
    let calls = discord.calls_to("works");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::POST);
    assert_eq!(calls[0].query.as_deref(), Some("wait=true"));
    assert_eq!(message_id, "msg-4");
}

#[tokio::test]
async fn editing_an_announced_work_patches_its_message() {
    let discord = FakeDiscord::default();
    let (app, store) = build_app_with_notifier(discord.start().await);
    let id = submitted_work(&app, &store).await;
    approve(&app, &id).await;
    let message_id = work_message_id(&store, &id).await;

    let mut edit = work_json("Tide (final)", &[1], "https://cdn.example/a.png");
    edit["id"] = json!(id);
    let response = put_json(&app, "/work", Some(&token_for(ARTIST_ID)), edit).await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = discord.wait_for_calls("works", 2).await;
    assert_eq!(calls[1].method, Method::PATCH);
    assert_eq!(calls[1].path, format!("/hooks/works/messages/{message_id}"));
    assert_eq!(calls[1].body["embeds"][0]["title"], "Tide (final)");
}

#[tokio::test]
async fn unavailable_webhook_is_retried() {
    let discord = FakeDiscord::default();
    let (app, store) = build_app_with_notifier(discord.start().await);
    let id = submitted_work(&app, &store).await;

    discord.fail_next(1);
    approve(&app, &id).await;

    let message_id = work_message_id(&store, &id).await;
    assert_eq!(message_id, "msg-4");
    assert_eq!(discord.calls_to("works").len(), 2);
}

#[tokio::test]
async fn failed_announcement_does_not_fail_the_approval() {
    let discord = FakeDiscord::default();
    let (app, store) = build_app_with_notifier(discord.start().await);
    let id = submitted_work(&app, &store).await;

    discord.fail_next(usize::MAX);
    let approved = approve(&app, &id).await;
    assert_eq!(approved["isApproved"], true);

    // One attempt plus two retries, then the announcement is dropped.
    discord.wait_for_calls("works", 3).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(discord.calls_to("works").len(), 3);

    let stored = WorkRepo::find_by_id(&store, &id).await.unwrap().unwrap();
    assert!(stored.is_approved);
    assert_eq!(stored.discord_id, None);
}
