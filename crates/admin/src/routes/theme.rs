//! Theme toggle and system colour scheme tracking.

use axum::{
    Form, Json, Router,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use backoffice_core::Theme;

use crate::{
    state::AppState,
    theme::{ThemeContext, ThemeView},
};

/// Build the theme router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/theme/toggle", post(toggle))
        .route("/theme/system", post(system_change))
}

/// Body of the toggle button's form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ToggleForm {
    /// Page to go back to.
    pub return_to: Option<String>,
    /// Theme the page was showing when the button was pressed.
    pub current: Option<String>,
}

/// Body sent by the page script when the OS colour scheme changes.
#[derive(Debug, Deserialize)]
pub struct SystemChangeForm {
    pub scheme: String,
}

/// Theme after a system colour scheme change.
#[derive(Debug, Serialize)]
pub struct SystemChangeResponse {
    /// `false` when a stored preference kept the theme as it was.
    pub changed: bool,
    #[serde(flatten)]
    pub theme: ThemeView,
}

/// Local path to return to, falling back to `/`.
///
/// Only same-origin absolute paths are accepted.
fn safe_return_to(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// Flip the displayed theme, store it, and go back to the page.
///
/// The page reports what it shows in `current`; without it the theme
/// resolved from the request is flipped.
#[instrument(skip_all)]
pub async fn toggle(mut theme: ThemeContext, Form(form): Form<ToggleForm>) -> Response {
    if let Some(displayed) = form.current.as_deref().and_then(Theme::from_stored) {
        theme.adopt_displayed(displayed);
    }
    let applied = theme.toggle();
    debug!(theme = applied.as_str(), "Theme toggled");

    let mut headers = HeaderMap::new();
    if let Some(cookie) = theme.set_cookie() {
        headers.append(SET_COOKIE, cookie);
    }
    let target = safe_return_to(form.return_to.as_deref());
    (headers, Redirect::to(target)).into_response()
}

/// Follow an OS colour scheme change while no preference is stored.
#[instrument(skip_all, fields(scheme = %form.scheme))]
pub async fn system_change(
    mut theme: ThemeContext,
    Form(form): Form<SystemChangeForm>,
) -> Json<SystemChangeResponse> {
    let system = Theme::from_stored(&form.scheme).unwrap_or_default();
    let changed = theme.on_system_change(system).is_some();

    Json(SystemChangeResponse {
        changed,
        theme: theme.view(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_to() {
        assert_eq!(safe_return_to(Some("/users?edit=3")), "/users?edit=3");
        assert_eq!(safe_return_to(Some("https://evil.example")), "/");
        assert_eq!(safe_return_to(Some("//evil.example")), "/");
        assert_eq!(safe_return_to(Some("/\\evil.example")), "/");
        assert_eq!(safe_return_to(None), "/");
    }
}
