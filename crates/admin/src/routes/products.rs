//! Products list page and its create/edit/delete actions.
//!
//! `/products` is the admin's landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tracing::{info, instrument};

use backoffice_core::ProductId;

use super::crud::{
    ConfirmView, DeleteForm, ListQuery, ListView, ModalView, Overlay, delete_prompt_href, respond,
};
use super::layout::ShellView;
use crate::{
    backend::Product,
    error::AppError,
    filters,
    forms::{ProductForm, ProductInput, ProductSubmission},
    state::AppState,
    theme::ThemeContext,
};

const LIST_HREF: &str = "/products";

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/table", get(table))
        .route("/products/{id}", post(update))
        .route("/products/{id}/delete", post(delete))
}

// =============================================================================
// Views
// =============================================================================

/// One table row.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub tags: Vec<String>,
    pub in_stock: bool,
    pub delete_pending: bool,
}

impl ProductRow {
    fn new(product: &Product, delete_pending: bool) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            category: product.category.clone(),
            tags: product.tags.iter().map(str::to_string).collect(),
            in_stock: product.in_stock,
            delete_pending,
        }
    }
}

/// Products page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
struct ProductsPage {
    shell: ShellView,
    list: ListView<ProductRow>,
    modal: Option<ModalView>,
    confirm: Option<ConfirmView>,
}

/// Products table fragment, reloaded by the page script.
#[derive(Template, WebTemplate)]
#[template(path = "products/table.html")]
struct ProductsTable {
    list: ListView<ProductRow>,
}

fn product_modal(form: &ProductForm, form_error: Option<String>) -> ModalView {
    let (title, action, submit_label) = match form.target() {
        Some(id) => (
            "Edit product".to_string(),
            format!("{LIST_HREF}/{id}"),
            "Save changes",
        ),
        None => ("Add product".to_string(), LIST_HREF.to_string(), "Create product"),
    };
    ModalView {
        title,
        action,
        submit_label,
        close_href: LIST_HREF,
        fields: form.fields(),
        form_error,
    }
}

async fn list(state: &AppState) -> ListView<ProductRow> {
    let products = state.products();
    let busy = products.mutation_status().is_pending();
    ListView::from_fetch("products", products.fetch().await, |product| {
        ProductRow::new(product, products.is_delete_pending(product.id))
    })
    .with_busy(busy)
}

async fn describe(state: &AppState, id: ProductId) -> String {
    state
        .products()
        .fetch()
        .await
        .ok()
        .and_then(|products| {
            products
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
        })
        .map_or_else(
            || format!("product #{id}"),
            |name| format!("product \"{name}\""),
        )
}

async fn render(
    state: &AppState,
    theme: &ThemeContext,
    status: StatusCode,
    modal: Option<ModalView>,
    confirm: Option<ConfirmView>,
) -> Response {
    let page = ProductsPage {
        shell: ShellView::new("Products", LIST_HREF, theme),
        list: list(state).await,
        modal,
        confirm,
    };
    respond(status, theme, page)
}

// =============================================================================
// Handlers
// =============================================================================

/// Products list page, with the overlay selected by the query string.
#[instrument(skip(state, theme))]
pub async fn index(
    State(state): State<AppState>,
    theme: ThemeContext,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (modal, confirm) = match query.overlay::<ProductId>() {
        Overlay::None => (None, None),
        Overlay::Create => (Some(product_modal(&ProductForm::new(), None)), None),
        Overlay::Edit(id) => {
            let product = state.products().resource().get(id).await?;
            (Some(product_modal(&ProductForm::edit(&product), None)), None)
        }
        Overlay::ConfirmDelete(id) => {
            let pending = state.products().is_delete_pending(id);
            let what = describe(&state, id).await;
            (None, Some(ConfirmView::delete(LIST_HREF, &what, id, pending)))
        }
    };

    Ok(render(&state, &theme, StatusCode::OK, modal, confirm).await)
}

/// Table fragment.
#[instrument(skip(state))]
pub async fn table(State(state): State<AppState>) -> impl IntoResponse {
    ProductsTable {
        list: list(&state).await,
    }
}

/// Create a product.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    theme: ThemeContext,
    Form(input): Form<ProductInput>,
) -> Response {
    submit(&state, &theme, ProductForm::from_input(None, input)).await
}

/// Update a product.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    theme: ThemeContext,
    Path(id): Path<ProductId>,
    Form(input): Form<ProductInput>,
) -> Response {
    submit(&state, &theme, ProductForm::from_input(Some(id), input)).await
}

async fn submit(state: &AppState, theme: &ThemeContext, mut form: ProductForm) -> Response {
    let Some(submission) = form.submit() else {
        return render(
            state,
            theme,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(product_modal(&form, None)),
            None,
        )
        .await;
    };

    let products = state.products();
    let result = match &submission {
        ProductSubmission::Create(payload) => {
            products
                .mutate(products.resource().create(payload), |product| {
                    info!(product_id = %product.id, "Product created");
                })
                .await
        }
        ProductSubmission::Update(id, payload) => {
            products
                .mutate(products.resource().update(*id, payload), |product| {
                    info!(product_id = %product.id, "Product updated");
                })
                .await
        }
    };

    match result {
        Ok(_) => Redirect::to(LIST_HREF).into_response(),
        Err(e) => {
            render(
                state,
                theme,
                StatusCode::BAD_GATEWAY,
                Some(product_modal(&form, Some(e.to_string()))),
                None,
            )
            .await
        }
    }
}

/// Delete a product once the prompt was confirmed.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    theme: ThemeContext,
    Path(id): Path<ProductId>,
    Form(form): Form<DeleteForm>,
) -> Response {
    if !form.is_confirmed() {
        return Redirect::to(&delete_prompt_href(LIST_HREF, id)).into_response();
    }

    let products = state.products();
    let Some(guard) = products.begin_delete(id) else {
        let what = describe(&state, id).await;
        let confirm = ConfirmView::delete(LIST_HREF, &what, id, true);
        return render(&state, &theme, StatusCode::CONFLICT, None, Some(confirm)).await;
    };

    let result = products
        .mutate(products.resource().delete(id), |()| {
            info!(product_id = %id, "Product deleted");
        })
        .await;
    drop(guard);

    match result {
        Ok(()) => Redirect::to(LIST_HREF).into_response(),
        Err(e) => {
            let what = describe(&state, id).await;
            let confirm =
                ConfirmView::delete(LIST_HREF, &what, id, false).with_error(Some(e.to_string()));
            render(&state, &theme, StatusCode::BAD_GATEWAY, None, Some(confirm)).await
        }
    }
}
