//! Theme controller wired to HTTP requests.
//!
//! The preference lives in the `theme` cookie and the system colour scheme
//! arrives as the `Sec-CH-Prefers-Color-Scheme` client hint, which the admin
//! requests on every response. A controller is built per request from those
//! two headers and renders into a [`ThemeView`] for the page shell.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use backoffice_core::Theme;
use cookie::{Cookie, SameSite};

use super::{PreferenceStore, StoreError, ThemeController, ThemeSurface, ToggleState};
use crate::state::AppState;

/// Name of the cookie holding the stored preference.
pub const THEME_COOKIE: &str = "theme";

/// Client hint carrying the browser's colour scheme.
pub const SYSTEM_HINT_HEADER: &str = "sec-ch-prefers-color-scheme";

/// Lifetime of the preference cookie.
const COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Read the system colour scheme from the request's client hint.
///
/// Browsers without client hint support send nothing, which reads as light.
#[must_use]
pub fn system_preference(headers: &HeaderMap) -> Theme {
    headers
        .get(SYSTEM_HINT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().trim_matches('"'))
        .and_then(Theme::from_stored)
        .unwrap_or_default()
}

// =============================================================================
// Cookie store
// =============================================================================

/// [`PreferenceStore`] over the request's `Cookie` header.
///
/// Writes become a `Set-Cookie` header for the response.
#[derive(Debug, Clone)]
pub struct CookieStore {
    stored: Result<Option<String>, StoreError>,
    secure: bool,
    outgoing: Option<Cookie<'static>>,
}

impl CookieStore {
    /// Store reading the `theme` cookie from `headers`.
    ///
    /// `secure` marks written cookies HTTPS-only.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        Self {
            stored: read_theme_cookie(headers),
            secure,
            outgoing: None,
        }
    }

    /// `Set-Cookie` value for the last write, if any.
    #[must_use]
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        self.outgoing
            .as_ref()
            .and_then(|cookie| HeaderValue::from_str(&cookie.to_string()).ok())
    }
}

impl PreferenceStore for CookieStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        self.stored.clone()
    }

    fn save(&mut self, value: &str) -> Result<(), StoreError> {
        let cookie = Cookie::build((THEME_COOKIE, value.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure)
            .max_age(time::Duration::days(COOKIE_MAX_AGE_DAYS))
            .build();

        self.stored = Ok(Some(value.to_string()));
        self.outgoing = Some(cookie);
        Ok(())
    }
}

fn read_theme_cookie(headers: &HeaderMap) -> Result<Option<String>, StoreError> {
    for header in headers.get_all(COOKIE) {
        let header = header
            .to_str()
            .map_err(|e| StoreError::Unreadable(e.to_string()))?;

        let found = Cookie::split_parse(header)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == THEME_COOKIE);
        if let Some(cookie) = found {
            return Ok(Some(cookie.value().to_string()));
        }
    }
    Ok(None)
}

// =============================================================================
// Rendered surface
// =============================================================================

/// [`ThemeSurface`] that records what the page should render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderedSurface {
    theme: Theme,
    toggle: Option<ToggleState>,
}

impl ThemeSurface for RenderedSurface {
    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn update_toggle(&mut self, state: ToggleState) {
        self.toggle = Some(state);
    }
}

impl RenderedSurface {
    /// Template-facing snapshot.
    #[must_use]
    pub fn view(&self) -> ThemeView {
        let toggle = self
            .toggle
            .unwrap_or_else(|| ToggleState::for_theme(self.theme));
        ThemeView {
            data_theme: self.theme.as_str(),
            label: toggle.label,
            pressed: toggle.pressed,
        }
    }
}

/// What the page shell needs to render the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ThemeView {
    /// Value of `<html data-theme>`.
    pub data_theme: &'static str,
    /// Toggle button label.
    pub label: &'static str,
    /// Toggle button `aria-pressed`.
    pub pressed: bool,
}

impl ThemeView {
    #[must_use]
    pub const fn aria_pressed(&self) -> &'static str {
        if self.pressed { "true" } else { "false" }
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// Per-request theme controller, already initialized.
///
/// ```rust,ignore
/// async fn page(theme: ThemeContext) -> impl IntoResponse {
///     let view = theme.view();
///     // ...
/// }
/// ```
pub struct ThemeContext {
    controller: ThemeController<CookieStore, RenderedSurface>,
}

impl ThemeContext {
    /// Build and initialize a controller from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let store = CookieStore::from_headers(headers, secure);
        let mut controller = ThemeController::new(Some(store), RenderedSurface::default());
        controller.initialize(system_preference(headers));
        Self { controller }
    }

    #[must_use]
    pub fn view(&self) -> ThemeView {
        self.controller.surface().view()
    }

    #[must_use]
    pub fn current(&self) -> Theme {
        self.controller.current()
    }

    /// Whether no preference is stored, so the page follows the OS scheme.
    #[must_use]
    pub fn follows_system(&self) -> bool {
        self.controller.stored_preference().is_unset()
    }

    /// Adopt the theme the page is actually showing.
    ///
    /// Browsers without client hints resolve to light here while the page
    /// script may have switched them to dark. Nothing is persisted.
    pub fn adopt_displayed(&mut self, displayed: Theme) {
        if displayed != self.controller.current() {
            self.controller.set_theme(displayed, false);
        }
    }

    /// Flip the applied theme and persist it.
    pub fn toggle(&mut self) -> Theme {
        self.controller.toggle()
    }

    /// Follow a system colour scheme change reported by the page.
    pub fn on_system_change(&mut self, system: Theme) -> Option<Theme> {
        self.controller.on_system_change(system)
    }

    /// `Set-Cookie` value to attach to the response, if the preference
    /// was written.
    #[must_use]
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        self.controller.store().and_then(CookieStore::set_cookie)
    }
}

impl FromRequestParts<AppState> for ThemeContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, state.config().is_secure()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(*name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_system_preference_reads_client_hint() {
        assert_eq!(
            system_preference(&headers(&[(SYSTEM_HINT_HEADER, "\"dark\"")])),
            Theme::Dark
        );
        assert_eq!(
            system_preference(&headers(&[(SYSTEM_HINT_HEADER, "light")])),
            Theme::Light
        );
        assert_eq!(system_preference(&HeaderMap::new()), Theme::Light);
        assert_eq!(
            system_preference(&headers(&[(SYSTEM_HINT_HEADER, "sepia")])),
            Theme::Light
        );
    }

    #[test]
    fn test_cookie_store_finds_theme_among_others() {
        let store = CookieStore::from_headers(
            &headers(&[("cookie", "a=1; theme=dark; b=2")]),
            false,
        );
        assert_eq!(store.load(), Ok(Some("dark".to_string())));
    }

    #[test]
    fn test_cookie_store_without_cookie() {
        let store = CookieStore::from_headers(&headers(&[("cookie", "a=1")]), false);
        assert_eq!(store.load(), Ok(None));
    }

    #[test]
    fn test_cookie_store_unreadable_header() {
        let mut map = HeaderMap::new();
        map.insert(COOKIE, HeaderValue::from_bytes(b"theme=\xffdark").unwrap());

        let store = CookieStore::from_headers(&map, false);
        assert!(matches!(store.load(), Err(StoreError::Unreadable(_))));
    }

    #[test]
    fn test_cookie_store_save_builds_set_cookie() {
        let mut store = CookieStore::from_headers(&HeaderMap::new(), true);
        store.save("light").unwrap();

        let value = store.set_cookie().unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("theme=light"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Secure"));
        assert!(value.contains("Max-Age=31536000"));
        assert_eq!(store.load(), Ok(Some("light".to_string())));
    }

    #[test]
    fn test_context_resolves_cookie_over_hint() {
        let ctx = ThemeContext::from_headers(
            &headers(&[("cookie", "theme=light"), (SYSTEM_HINT_HEADER, "\"dark\"")]),
            false,
        );
        assert_eq!(ctx.current(), Theme::Light);
        assert!(ctx.set_cookie().is_none());
    }

    #[test]
    fn test_context_toggle_writes_cookie() {
        let mut ctx =
            ThemeContext::from_headers(&headers(&[(SYSTEM_HINT_HEADER, "\"dark\"")]), false);
        assert_eq!(
            ctx.view(),
            ThemeView {
                data_theme: "dark",
                label: "Light mode",
                pressed: true
            }
        );

        assert_eq!(ctx.toggle(), Theme::Light);
        let cookie = ctx.set_cookie().unwrap();
        assert!(cookie.to_str().unwrap().starts_with("theme=light"));
        assert!(!cookie.to_str().unwrap().contains("Secure"));
        assert_eq!(ctx.view().aria_pressed(), "false");
    }

    #[test]
    fn test_context_toggle_flips_displayed_theme() {
        // No hint resolves light, but the page shows dark.
        let mut ctx = ThemeContext::from_headers(&HeaderMap::new(), false);
        assert!(ctx.follows_system());

        ctx.adopt_displayed(Theme::Dark);
        assert!(ctx.set_cookie().is_none());
        assert_eq!(ctx.view().label, "Light mode");

        assert_eq!(ctx.toggle(), Theme::Light);
        let cookie = ctx.set_cookie().unwrap();
        assert!(cookie.to_str().unwrap().starts_with("theme=light"));
    }

    #[test]
    fn test_context_with_cookie_does_not_follow_system() {
        let ctx = ThemeContext::from_headers(&headers(&[("cookie", "theme=dark")]), false);
        assert!(!ctx.follows_system());
    }
}
