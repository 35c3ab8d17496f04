//! Backoffice admin library.
//!
//! A server-rendered CRUD admin for the users and products of a REST
//! backend, with a persisted light/dark theme. This crate provides the admin
//! as a library so it can be tested end to end and embedded by tooling.
//!
//! # Architecture
//!
//! ```text
//! routes ──► query::QueryCache ──► backend::{UsersApi, ProductsApi} ──► REST backend
//!   │  ▲
//!   │  └── forms (draft → validate → submission)
//!   └───── theme::ThemeController (cookie + client hint)
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod forms;
pub mod query;
pub mod routes;
pub mod state;
pub mod theme;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request, Response, header::VARY};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Client hint carrying the OS colour scheme, as named in `Accept-CH`.
const COLOR_SCHEME_HINT: &str = "Sec-CH-Prefers-Color-Scheme";

/// Build the admin application: routes, static files, client hints and
/// request tracing.
///
/// # Middleware Order (outermost first)
///
/// 1. `TraceLayer` (request span with status and latency)
/// 2. `Accept-CH` / `Critical-CH` (ask for the colour scheme hint, on the
///    first request too)
/// 3. `Vary` (pages differ by that hint)
///
/// Sentry layers are added by the binary around all of this.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config().static_dir.clone();

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                status = tracing::field::Empty,
                latency_ms = tracing::field::Empty,
            )
        })
        .on_response(
            |response: &Response<Body>, latency: std::time::Duration, span: &Span| {
                span.record("status", response.status().as_u16());
                span.record(
                    "latency_ms",
                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                );
                DefaultOnResponse::default().on_response(response, latency, span);
            },
        );

    let client_hints = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("accept-ch"),
            HeaderValue::from_static(COLOR_SCHEME_HINT),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("critical-ch"),
            HeaderValue::from_static(COLOR_SCHEME_HINT),
        ))
        .layer(SetResponseHeaderLayer::appending(
            VARY,
            HeaderValue::from_static(COLOR_SCHEME_HINT),
        ));

    Router::new()
        .merge(routes::routes())
        .fallback(routes::not_found)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(ServiceBuilder::new().layer(trace).layer(client_hints))
        .with_state(state)
}
