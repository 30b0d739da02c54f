use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use artweeks_cloud::{PreviewFetcher, S3Config, UploadSigner};
use artweeks_db::StoreConfig;
use artweeks_discord::{DiscordConfig, Notifier};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artweeks_api::auth::JwksVerifier;
use artweeks_api::background;
use artweeks_api::config::ServerConfig;
use artweeks_api::router::build_app_router;
use artweeks_api::state::AppState;

/// Timeout for outbound JWKS requests.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artweeks_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        staff = config.staff_ids.len(),
        "Loaded server configuration"
    );

    // --- Store ---
    let store = match StoreConfig::from_env() {
        Some(store_config) => {
            let store = artweeks_db::connect(&store_config)
                .await
                .expect("Failed to connect to store");
            store
                .health_check()
                .await
                .expect("Store health check failed");
            tracing::info!(backend = store.backend(), "Store health check passed");
            Some(store)
        }
        None => {
            tracing::warn!("STORE_BACKEND is not set, data routes will answer 503");
            None
        }
    };

    // --- Auth ---
    let verifier = match &config.auth {
        Some(auth) => {
            let client = reqwest::Client::builder()
                .timeout(JWKS_FETCH_TIMEOUT)
                .build()
                .expect("Failed to build JWKS HTTP client");
            tracing::info!(issuer = %auth.issuer, jwks_url = %auth.jwks_url, "JWT verification enabled");
            Some(Arc::new(JwksVerifier::new(auth, client)))
        }
        None => {
            tracing::warn!("AUTH_ISSUER is not set, every caller is anonymous");
            None
        }
    };

    // --- Integrations ---
    let notifier = Notifier::new(&DiscordConfig::from_env()).expect("Invalid Discord webhook URL");

    let uploader = match S3Config::from_env() {
        Some(s3) => Some(Arc::new(UploadSigner::new(s3).await)),
        None => {
            tracing::info!("S3_BUCKET is not set, uploads are disabled");
            None
        }
    };

    let previews = PreviewFetcher::new().expect("Failed to build preview HTTP client");

    // --- App state ---
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
        verifier,
        notifier: Arc::new(notifier),
        uploader,
        previews: Some(Arc::new(previews)),
    };

    // --- Index reconciliation ---
    let reconcile_cancel = CancellationToken::new();
    let reconcile_handle = match &store {
        Some(store) if config.reconcile_interval_secs > 0 => Some(tokio::spawn(
            background::reconcile::run(
                store.clone(),
                Duration::from_secs(config.reconcile_interval_secs),
                reconcile_cancel.clone(),
            ),
        )),
        _ => None,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reconcile_cancel.cancel();
    if let Some(handle) = reconcile_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Index reconciliation stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
