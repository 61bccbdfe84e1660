//! Portfolio Showcase - library for app logic and testing

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod logging;
pub mod mail;
pub mod routes;
pub mod secret;
pub mod state;
pub mod uploads;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use thiserror::Error;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::{
    config::{AppConfig, ConfigError},
    db::Store,
    mail::{MailError, Mailer, SmtpMailer},
    state::AppState,
    uploads::{UploadDir, PUBLIC_PREFIX},
};

/// Largest accepted request: one maximum-size file plus multipart framing.
pub const MAX_REQUEST_BYTES: usize = routes::certificates::MAX_FILE_SIZE + 1024 * 1024;

#[derive(Debug, Error)]
pub enum BootError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to open database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("upload directory {path} is not usable: {source}")]
    UploadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to configure mailer: {0}")]
    Mail(#[from] MailError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the CORS layer from the configured origins. Unparsable entries are
/// skipped with a warning.
pub fn configure_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    tracing::info!("CORS enabled for: {}", allowed_origins.join(", "));

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState, allowed_origins: &[String]) -> Router {
    let cors = configure_cors(allowed_origins);
    let uploads = ServeDir::new(state.uploads.root());

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/health/ready", get(routes::health::health_ready))
        .route(
            "/api/certificates",
            get(routes::certificates::list_certificates),
        )
        .route(
            "/api/certificates/upload",
            post(routes::certificates::upload_certificate),
        )
        .route(
            "/api/certificates/{id}",
            delete(routes::certificates::delete_certificate),
        )
        .route(
            "/api/reviews",
            get(routes::reviews::list_reviews).post(routes::reviews::create_review),
        )
        .route("/api/reviews/stats", get(routes::reviews::review_stats))
        .route("/api/contact", post(routes::contact::send_message))
        .route("/api/contact/view", post(routes::contact::increment_view))
        .route("/api/contact/views", get(routes::contact::view_count))
        .nest_service(PUBLIC_PREFIX, uploads)
        .fallback(routes::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(logging::middleware::panic_response))
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Over-limit bodies fail inside the extractors, so they still get JSON errors.
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(cors)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn serve(config: AppConfig) -> Result<(), BootError> {
    tracing::info!(
        production = config.is_production(),
        "Starting portfolio backend ({})",
        config.environment
    );

    if config.delete_secret.is_none() {
        tracing::warn!(
            "SECURITY: Neither DELETE_PASSWORD_HASH nor DELETE_PASSWORD is set. \
             Certificate deletion is disabled."
        );
    }

    let store = Store::open(&config.database).await?;

    let uploads = UploadDir::provision(&config.upload_dir)
        .await
        .map_err(|source| BootError::UploadDir {
            path: config.upload_dir.clone(),
            source,
        })?;

    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(&config.mail)?);

    let state = AppState::new(
        store.clone(),
        uploads,
        mailer,
        config.delete_secret.clone(),
    );
    let app = create_app(state, &config.allowed_origins);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| BootError::Bind { addr, source })?;
    tracing::info!("Server running on http://{}", addr);
    tracing::info!("Upload directory: {}", config.upload_dir.display());

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(BootError::Serve);

    store.close().await;
    served
}

/// Run the server (used by main).
pub async fn run() -> Result<(), BootError> {
    dotenvy::dotenv().ok();

    // Dropping the guards stops the background writers and loses buffered lines.
    let _log_guards = logging::init();

    routes::health::init_start_time();

    let result = match AppConfig::from_env() {
        Ok(config) => serve(config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = &result {
        tracing::error!("FATAL: {}", e);
    }
    result
}
