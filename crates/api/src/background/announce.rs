//! Discord announcements, run off the request path.
//!
//! A handler commits its write, then hands the affected records to one of
//! the `spawn_*` functions and answers without waiting. Message ids returned
//! by Discord are written back to the store once the webhook call finishes.

use std::sync::Arc;

use artweeks_db::models::week::Week;
use artweeks_db::models::work::Work;
use artweeks_db::repositories::{WeekRepo, WorkRepo};
use artweeks_db::Store;
use artweeks_discord::Notifier;

/// Announce `weeks` in the background and store their message ids.
pub fn spawn_week_announcements(store: Store, notifier: Arc<Notifier>, weeks: Vec<Week>) {
    if weeks.is_empty() {
        return;
    }
    tokio::spawn(async move { announce_weeks(&store, &notifier, weeks).await });
}

/// Announce (or edit the announcement of) `work` in the background.
pub fn spawn_work_announcement(store: Store, notifier: Arc<Notifier>, work: Work) {
    tokio::spawn(async move { announce_work(&store, &notifier, work).await });
}

async fn announce_weeks(store: &Store, notifier: &Notifier, weeks: Vec<Week>) {
    for week in weeks {
        let Some(message_id) = notifier.announce_week(&week).await else {
            continue;
        };
        if week.discord_id.as_deref() == Some(message_id.as_str()) {
            continue;
        }
        match WeekRepo::set_discord_id(store, week.year, week.week, &message_id).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                year = week.year,
                week = week.week,
                "Week removed before its announcement id was stored"
            ),
            Err(e) => tracing::error!(
                year = week.year,
                week = week.week,
                error = %e,
                "Failed to store week announcement id"
            ),
        }
    }
}

async fn announce_work(store: &Store, notifier: &Notifier, work: Work) {
    let Some(message_id) = notifier.announce_work(&work).await else {
        return;
    };
    if work.discord_id.as_deref() == Some(message_id.as_str()) {
        return;
    }
    match WorkRepo::set_discord_id(store, &work.id, &message_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(work_id = %work.id, "Work vanished before its announcement id was stored")
        }
        Err(e) => {
            tracing::error!(work_id = %work.id, error = %e, "Failed to store work announcement id")
        }
    }
}
