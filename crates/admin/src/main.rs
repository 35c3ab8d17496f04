//! Backoffice Admin - users and products administration panel.
//!
//! This binary serves the admin panel on port 3001 in front of the REST
//! backend named by `BACKEND_URL`.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - REST backend for users and products
//! - Moka in-memory cache in front of the backend
//!
//! # Logging
//!
//! `RUST_LOG` filters as usual. `LOG_FORMAT=json` switches to one JSON
//! object per line for log shippers.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backoffice_admin::config::{AdminConfig, TlsConfig};
use backoffice_admin::state::AppState;

/// In-flight requests get this long to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

const DEFAULT_LOG_FILTER: &str = "backoffice_admin=info,tower_http=debug";

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };

    Some(sentry::init((dsn, options)))
}

/// WARN and ERROR become Sentry events, INFO and DEBUG breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    // TLS needs a process-wide crypto provider before any config is built.
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AdminConfig::from_env().expect("Failed to load configuration");

    // Sentry goes first so the tracing layer has a client to report to.
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    tracing::info!(
        backend = %config.backend.base_url,
        cache_ttl_secs = config.cache.ttl.as_secs(),
        sentry = config.sentry_dsn.is_some(),
        "Starting admin"
    );

    let addr = config.socket_addr();
    let app = backoffice_admin::app(AppState::new(config.clone()))
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    match &config.tls {
        Some(tls) => serve_tls(app, addr, tls).await,
        None => serve_plain(app, addr).await,
    }
}

async fn serve_tls(app: Router, addr: SocketAddr, tls: &TlsConfig) {
    let rustls_config = RustlsConfig::from_pem(
        tls.cert_pem.as_bytes().to_vec(),
        tls.key_pem.expose_secret().as_bytes().to_vec(),
    )
    .await
    .expect("Failed to load TLS certificates");

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    tracing::info!(%addr, "Admin listening on https");
    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .expect("Server error");
}

async fn serve_plain(app: Router, addr: SocketAddr) {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(%addr, "Admin listening on http");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
