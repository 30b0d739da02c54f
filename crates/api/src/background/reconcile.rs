//! Periodic rebuild of the derived work indexes.
//!
//! Repairs divergence left by interrupted fan-outs or by writers in other
//! processes. Runs on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use artweeks_db::repositories::WorkRepo;
use artweeks_db::Store;
use tokio_util::sync::CancellationToken;

/// Run the reconciliation loop until `cancel` is triggered.
///
/// The first rebuild happens one full `interval` after startup.
pub async fn run(store: Store, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Index reconciliation job started");

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Index reconciliation job stopping");
                break;
            }
            _ = ticker.tick() => {
                match WorkRepo::reindex(&store).await {
                    Ok(report) => {
                        if report.stale_indexes_removed > 0 {
                            tracing::info!(
                                stale = report.stale_indexes_removed,
                                "Index reconciliation: removed stale documents"
                            );
                        } else {
                            tracing::debug!(listed = report.listed, "Index reconciliation: done");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Index reconciliation failed");
                    }
                }
            }
        }
    }
}
