//! Integration tests for the products page.
//!
//! Each test runs the admin against an in-memory backend; see
//! `backoffice_integration_tests::TestContext`.

use backoffice_integration_tests::{TestContext, location, text};
use reqwest::StatusCode;

const VALID_PRODUCT: [(&str, &str); 6] = [
    ("name", "Desk lamp"),
    ("description", "Warm white LED"),
    ("price", "39.90"),
    ("category", "lighting"),
    ("tags", "desk, led ,,"),
    ("in_stock", "on"),
];

// ============================================================================
// List Tests
// ============================================================================

#[tokio::test]
async fn test_products_list_shows_records() {
    let ctx = TestContext::start().await;
    ctx.backend.insert_product("Keyboard", 89.0);

    let (status, body) = ctx.get_text("/products").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Keyboard"));
    assert!(body.contains("$89.00"));
    assert!(body.contains(r#"data-collection="products""#));
}

#[tokio::test]
async fn test_products_list_empty_state() {
    let ctx = TestContext::start().await;

    let (status, body) = ctx.get_text("/products").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No products yet"));
}

#[tokio::test]
async fn test_products_list_is_cached() {
    let ctx = TestContext::start().await;
    ctx.backend.insert_product("Keyboard", 89.0);

    ctx.get_text("/products").await;
    ctx.get_text("/products").await;
    ctx.get_text("/products/table").await;

    assert_eq!(ctx.backend.calls("GET", "/products"), 1);
}

#[tokio::test]
async fn test_products_list_error_is_not_cached() {
    let ctx = TestContext::start().await;
    ctx.backend.insert_product("Keyboard", 89.0);
    ctx.backend.fail_reads(true);

    let (status, body) = ctx.get_text("/products").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Could not load products."));

    ctx.backend.fail_reads(false);
    let (_, body) = ctx.get_text("/products").await;
    assert!(body.contains("Keyboard"));
    assert_eq!(ctx.backend.calls("GET", "/products"), 2);
}

#[tokio::test]
async fn test_table_fragment_has_no_shell() {
    let ctx = TestContext::start().await;
    ctx.backend.insert_product("Keyboard", 89.0);

    let (status, body) = ctx.get_text("/products/table").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Keyboard"));
    assert!(!body.contains("<html"));
}

// ============================================================================
// Create & Edit Tests
// ============================================================================

#[tokio::test]
async fn test_new_product_modal_has_defaults() {
    let ctx = TestContext::start().await;

    let (status, body) = ctx.get_text("/products?modal=new").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Add product"));
    assert!(body.contains(r#"name="price" value="0""#));
    assert!(body.contains(r#"name="in_stock" value="true" checked"#));
}

#[tokio::test]
async fn test_create_product_redirects_and_lists_it() {
    let ctx = TestContext::start().await;

    let resp = ctx.post_form("/products", &VALID_PRODUCT).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/products"));

    let sent = ctx
        .backend
        .last_body("POST", "/products")
        .expect("create was sent");
    assert_eq!(sent["name"], "Desk lamp");
    assert_eq!(sent["price"], 39.9);
    assert_eq!(sent["tags"], serde_json::json!(["desk", "led"]));
    assert_eq!(sent["in_stock"], true);

    let (_, body) = ctx.get_text("/products").await;
    assert!(body.contains("Desk lamp"));
    assert!(body.contains("$39.90"));
}

#[tokio::test]
async fn test_create_product_after_list_refetches() {
    let ctx = TestContext::start().await;
    ctx.get_text("/products").await;

    ctx.post_form("/products", &VALID_PRODUCT).await;
    let (_, body) = ctx.get_text("/products").await;

    assert!(body.contains("Desk lamp"));
    assert_eq!(ctx.backend.calls("GET", "/products"), 2);
}

#[tokio::test]
async fn test_negative_price_is_rejected_without_a_request() {
    let ctx = TestContext::start().await;
    let mut form = VALID_PRODUCT;
    form[2] = ("price", "-1");

    let (status, body) = text(ctx.post_form("/products", &form).await).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("price must be 0 or greater"));
    assert!(body.contains(r#"value="Desk lamp""#));
    assert_eq!(ctx.backend.calls("POST", "/products"), 0);
}

#[tokio::test]
async fn test_blank_required_fields_are_all_reported() {
    let ctx = TestContext::start().await;

    let (status, body) = text(
        ctx.post_form(
            "/products",
            &[("name", " "), ("description", ""), ("price", "abc"), ("category", "")],
        )
        .await,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body.matches("This field is required").count(), 3);
    assert!(body.contains("price must be a number"));
    assert_eq!(ctx.backend.calls("POST", "/products"), 0);
}

#[tokio::test]
async fn test_backend_failure_keeps_the_modal_open() {
    let ctx = TestContext::start().await;
    ctx.backend.fail_writes(true);

    let (status, body) = text(ctx.post_form("/products", &VALID_PRODUCT).await).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Backend unavailable"));
    assert!(body.contains(r#"value="Desk lamp""#));
    assert_eq!(ctx.backend.calls("POST", "/products"), 1);
}

#[tokio::test]
async fn test_edit_modal_is_prefilled() {
    let ctx = TestContext::start().await;
    let id = ctx.backend.insert_product("Keyboard", 89.0);

    let (status, body) = ctx.get_text(&format!("/products?edit={id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Edit product"));
    assert!(body.contains(r#"value="Keyboard""#));
    assert!(body.contains(&format!(r#"action="/products/{id}""#)));
}

#[tokio::test]
async fn test_edit_unknown_product_is_not_found() {
    let ctx = TestContext::start().await;

    let resp = ctx.get("/products?edit=404").await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_product_sends_put() {
    let ctx = TestContext::start().await;
    let id = ctx.backend.insert_product("Keyboard", 89.0);
    let path = format!("/products/{id}");

    let mut form = VALID_PRODUCT.to_vec();
    form.retain(|(name, _)| *name != "in_stock");
    let resp = ctx.post_form(&path, &form).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let record = ctx.backend.record_of("products", id).expect("still stored");
    assert_eq!(record["name"], "Desk lamp");
    assert_eq!(record["in_stock"], false);
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn test_unconfirmed_delete_only_prompts() {
    let ctx = TestContext::start().await;
    let id = ctx.backend.insert_product("Keyboard", 89.0);

    let resp = ctx.post_form(&format!("/products/{id}/delete"), &[]).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some(format!("/products?delete={id}")));
    assert_eq!(ctx.backend.calls("DELETE", &format!("/products/{id}")), 0);
    assert!(ctx.backend.record_of("products", id).is_some());
}

#[tokio::test]
async fn test_delete_prompt_names_the_record() {
    let ctx = TestContext::start().await;
    let id = ctx.backend.insert_product("Keyboard", 89.0);

    let (status, body) = ctx.get_text(&format!("/products?delete={id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Confirm delete"));
    assert!(body.contains("Keyboard"));
    assert!(body.contains(r#"name="confirm" value="true""#));
}

#[tokio::test]
async fn test_confirmed_delete_removes_the_record() {
    let ctx = TestContext::start().await;
    let id = ctx.backend.insert_product("Keyboard", 89.0);
    ctx.get_text("/products").await;

    let resp = ctx
        .post_form(&format!("/products/{id}/delete"), &[("confirm", "true")])
        .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/products"));
    assert_eq!(ctx.backend.calls("DELETE", &format!("/products/{id}")), 1);

    let (_, body) = ctx.get_text("/products").await;
    assert!(body.contains("No products yet"));
}

#[tokio::test]
async fn test_failed_delete_shows_the_error() {
    let ctx = TestContext::start().await;
    let id = ctx.backend.insert_product("Keyboard", 89.0);
    ctx.backend.fail_writes(true);

    let (status, body) = text(
        ctx.post_form(&format!("/products/{id}/delete"), &[("confirm", "true")])
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Backend unavailable"));
    assert!(body.contains("Confirm delete"));
}
