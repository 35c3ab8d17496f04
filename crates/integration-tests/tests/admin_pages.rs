//! Integration tests for the page shell, theme handling, and health checks.

use backoffice_integration_tests::{TestContext, location, text};
use reqwest::StatusCode;
use serde_json::Value;

const HINT: &str = "Sec-CH-Prefers-Color-Scheme";

// ============================================================================
// Shell Tests
// ============================================================================

#[tokio::test]
async fn test_root_redirects_to_products() {
    let ctx = TestContext::start().await;

    let resp = ctx.get("/").await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/products"));
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let ctx = TestContext::start().await;

    let (status, body) = ctx.get_text("/nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page not found"));
    assert!(body.contains("/nowhere"));
}

#[tokio::test]
async fn test_unknown_event_stream_is_not_found() {
    let ctx = TestContext::start().await;

    let resp = ctx.get("/events/orders").await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pages_ask_for_the_colour_scheme_hint() {
    let ctx = TestContext::start().await;

    let resp = ctx.get("/products").await;

    let accept_ch = resp
        .headers()
        .get("accept-ch")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(accept_ch.contains(HINT));
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::start().await;

    let (status, body) = ctx.get_text("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_readiness_probes_the_backend() {
    let ctx = TestContext::start().await;

    let resp = ctx.get("/health/ready").await;

    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Theme Tests
// ============================================================================

#[tokio::test]
async fn test_theme_defaults_to_light_without_hint() {
    let ctx = TestContext::start().await;

    let (_, body) = ctx.get_text("/products").await;

    assert!(body.contains(r#"data-theme="light""#));
    assert!(body.contains(r#"aria-pressed="false">Dark mode"#));
}

#[tokio::test]
async fn test_theme_follows_system_hint() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .client
        .get(ctx.url("/products"))
        .header(HINT, "dark")
        .send()
        .await
        .expect("GET request failed");
    let (_, body) = text(resp).await;

    assert!(body.contains(r#"data-theme="dark""#));
    assert!(body.contains(r#"aria-pressed="true">Light mode"#));
}

#[tokio::test]
async fn test_toggle_stores_preference_over_system() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .post_form("/theme/toggle", &[("return_to", "/users")])
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/users"));
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("theme=dark"));

    let resp = ctx
        .client
        .get(ctx.url("/users"))
        .header(HINT, "light")
        .send()
        .await
        .expect("GET request failed");
    let (_, body) = text(resp).await;
    assert!(body.contains(r#"data-theme="dark""#));
}

#[tokio::test]
async fn test_toggle_twice_returns_to_light() {
    let ctx = TestContext::start().await;

    ctx.post_form("/theme/toggle", &[("return_to", "/")]).await;
    ctx.post_form("/theme/toggle", &[("return_to", "/")]).await;

    let (_, body) = ctx.get_text("/products").await;
    assert!(body.contains(r#"data-theme="light""#));
}

#[tokio::test]
async fn test_toggle_rejects_foreign_return_target() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .post_form("/theme/toggle", &[("return_to", "https://evil.example/")])
        .await;

    assert_eq!(location(&resp).as_deref(), Some("/"));
}

#[tokio::test]
async fn test_system_change_applies_without_preference() {
    let ctx = TestContext::start().await;

    let resp = ctx.post_form("/theme/system", &[("scheme", "dark")]).await;
    let json: Value = resp.json().await.expect("JSON body");

    assert_eq!(json["changed"], true);
    assert_eq!(json["data_theme"], "dark");
    assert_eq!(json["label"], "Light mode");
    assert_eq!(json["pressed"], true);
}

#[tokio::test]
async fn test_system_change_ignored_with_preference() {
    let ctx = TestContext::start().await;
    ctx.post_form("/theme/toggle", &[("return_to", "/")]).await;

    let resp = ctx.post_form("/theme/system", &[("scheme", "light")]).await;
    let json: Value = resp.json().await.expect("JSON body");

    assert_eq!(json["changed"], false);
    assert_eq!(json["data_theme"], "dark");
}

#[tokio::test]
async fn test_toggle_flips_the_theme_shown_without_hint() {
    let ctx = TestContext::start().await;

    // No client hint: the page script reports a dark OS scheme.
    let resp = ctx.post_form("/theme/system", &[("scheme", "dark")]).await;
    let json: Value = resp.json().await.expect("JSON body");
    assert_eq!(json["data_theme"], "dark");

    let resp = ctx
        .post_form("/theme/toggle", &[("return_to", "/"), ("current", "dark")])
        .await;
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("theme=light"), "got {cookie}");

    let (_, body) = ctx.get_text("/products").await;
    assert!(body.contains(r#"data-theme="light""#));
    assert!(body.contains(r#"aria-pressed="false">Dark mode"#));
}

#[tokio::test]
async fn test_toggle_ignores_unknown_displayed_theme() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .post_form("/theme/toggle", &[("return_to", "/"), ("current", "sepia")])
        .await;
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    assert!(cookie.starts_with("theme=dark"));
}

#[tokio::test]
async fn test_toggle_form_carries_displayed_theme() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .client
        .get(ctx.url("/products"))
        .header(HINT, "dark")
        .send()
        .await
        .expect("GET request failed");
    let (_, body) = text(resp).await;

    assert!(body.contains(r#"name="current" id="theme-current" value="dark""#));
}

#[tokio::test]
async fn test_head_script_only_without_stored_preference() {
    let ctx = TestContext::start().await;

    let (_, body) = ctx.get_text("/products").await;
    assert!(body.contains("prefers-color-scheme: dark"));

    ctx.post_form("/theme/toggle", &[("return_to", "/")]).await;

    let (_, body) = ctx.get_text("/products").await;
    assert!(!body.contains("prefers-color-scheme: dark"));
}
