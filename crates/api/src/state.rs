use std::sync::Arc;

use artweeks_cloud::{PreviewFetcher, UploadSigner};
use artweeks_db::Store;
use artweeks_discord::Notifier;

use crate::auth::JwksVerifier;
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Bound store. `None` when `STORE_BACKEND` is unset; data routes then
    /// answer 503.
    pub store: Option<Store>,
    pub config: Arc<ServerConfig>,
    /// Token verifier. `None` leaves every caller anonymous.
    pub verifier: Option<Arc<JwksVerifier>>,
    pub notifier: Arc<Notifier>,
    /// Presigned upload support. `None` when `S3_BUCKET` is unset.
    pub uploader: Option<Arc<UploadSigner>>,
    /// Thumbnail scraping for link-only items. `None` skips it.
    pub previews: Option<Arc<PreviewFetcher>>,
}

impl AppState {
    /// The bound store, or 503.
    pub fn store(&self) -> AppResult<&Store> {
        self.store.as_ref().ok_or(AppError::StoreUnavailable)
    }
}
