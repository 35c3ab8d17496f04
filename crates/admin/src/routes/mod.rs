//! HTTP route handlers for the admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (probes the backend)
//!
//! GET  /                            - Redirects to /products
//!
//! # Products (default page)
//! GET  /products                    - List; ?modal=new | ?edit={id} | ?delete={id}
//! GET  /products/table              - Table fragment
//! POST /products                    - Create
//! POST /products/{id}               - Update
//! POST /products/{id}/delete        - Delete (requires confirm=true)
//!
//! # Users
//! GET  /users                       - List; ?modal=new | ?edit={id} | ?delete={id}
//! GET  /users/table                 - Table fragment
//! POST /users                       - Create
//! POST /users/{id}                  - Update
//! POST /users/{id}/delete           - Delete (requires confirm=true)
//!
//! # Theme
//! POST /theme/toggle                - Flip and persist the theme
//! POST /theme/system                - Report an OS colour scheme change
//!
//! # Live refresh
//! GET  /events/{key}                - SSE stream of cache events ("users", "products")
//! ```

pub mod crud;
mod events;
pub mod layout;
mod products;
mod theme;
mod users;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::warn;

use crate::{filters, state::AppState, theme::ThemeContext};
use layout::ShellView;

/// All page and action routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/", get(home))
        .merge(products::router())
        .merge(users::router())
        .merge(theme::router())
        .merge(events::router())
}

/// The landing page is the products list.
async fn home() -> Redirect {
    Redirect::to("/products")
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend's `/health` fails.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.backend().health().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "Backend not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
struct NotFoundPage {
    shell: ShellView,
    path: String,
}

/// Fallback for unknown paths: a 404 page inside the shell.
pub async fn not_found(theme: ThemeContext, uri: Uri) -> Response {
    let page = NotFoundPage {
        shell: ShellView::new("Not found", uri.path(), &theme),
        path: uri.path().to_string(),
    };
    (StatusCode::NOT_FOUND, page).into_response()
}
