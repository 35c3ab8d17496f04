//! Users list page and its create/edit/delete actions.

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

use backoffice_core::UserId;

use super::crud::{
    ConfirmView, DeleteForm, ListQuery, ListView, ModalView, Overlay, delete_prompt_href, respond,
};
use super::layout::ShellView;
use crate::{
    backend::User,
    error::AppError,
    filters,
    forms::{UserForm, UserInput, UserSubmission},
    state::AppState,
    theme::ThemeContext,
};

const LIST_HREF: &str = "/users";

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(index).post(create))
        .route("/users/table", get(table))
        .route("/users/{id}", post(update))
        .route("/users/{id}/delete", post(delete))
}

// =============================================================================
// Views
// =============================================================================

/// One table row.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub delete_pending: bool,
}

impl UserRow {
    fn new(user: &User, delete_pending: bool) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.to_string(),
            created_at: user.created_at.format("%Y-%m-%d %H:%M").to_string(),
            delete_pending,
        }
    }
}

/// Users page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
struct UsersPage {
    shell: ShellView,
    list: ListView<UserRow>,
    modal: Option<ModalView>,
    confirm: Option<ConfirmView>,
}

/// Users table fragment, reloaded by the page script.
#[derive(Template, WebTemplate)]
#[template(path = "users/table.html")]
struct UsersTable {
    list: ListView<UserRow>,
}

fn user_modal(form: &UserForm, form_error: Option<String>) -> ModalView {
    let (title, action, submit_label) = match form.target() {
        Some(id) => ("Edit user".to_string(), format!("{LIST_HREF}/{id}"), "Save changes"),
        None => ("Add user".to_string(), LIST_HREF.to_string(), "Create user"),
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

async fn list(state: &AppState) -> ListView<UserRow> {
    let users = state.users();
    let busy = users.mutation_status().is_pending();
    ListView::from_fetch("users", users.fetch().await, |user| {
        UserRow::new(user, users.is_delete_pending(user.id))
    })
    .with_busy(busy)
}

/// Name of a user for the delete prompt, from the cached list when possible.
async fn describe(state: &AppState, id: UserId) -> String {
    state
        .users()
        .fetch()
        .await
        .ok()
        .and_then(|users| users.iter().find(|u| u.id == id).map(|u| u.name.clone()))
        .map_or_else(|| format!("user #{id}"), |name| format!("user \"{name}\""))
}

async fn render(
    state: &AppState,
    theme: &ThemeContext,
    status: StatusCode,
    modal: Option<ModalView>,
    confirm: Option<ConfirmView>,
) -> Response {
    let page = UsersPage {
        shell: ShellView::new("Users", LIST_HREF, theme),
        list: list(state).await,
        modal,
        confirm,
    };
    respond(status, theme, page)
}

// =============================================================================
// Handlers
// =============================================================================

/// Users list page, with the overlay selected by the query string.
#[instrument(skip(state, theme))]
pub async fn index(
    State(state): State<AppState>,
    theme: ThemeContext,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let (modal, confirm) = match query.overlay::<UserId>() {
        Overlay::None => (None, None),
        Overlay::Create => (Some(user_modal(&UserForm::new(), None)), None),
        Overlay::Edit(id) => {
            let user = state.users().resource().get(id).await?;
            (Some(user_modal(&UserForm::edit(&user), None)), None)
        }
        Overlay::ConfirmDelete(id) => {
            let pending = state.users().is_delete_pending(id);
            let what = describe(&state, id).await;
            (None, Some(ConfirmView::delete(LIST_HREF, &what, id, pending)))
        }
    };

    Ok(render(&state, &theme, StatusCode::OK, modal, confirm).await)
}

/// Table fragment.
#[instrument(skip(state))]
pub async fn table(State(state): State<AppState>) -> impl IntoResponse {
    UsersTable {
        list: list(&state).await,
    }
}

/// Create a user.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    theme: ThemeContext,
    Form(input): Form<UserInput>,
) -> Response {
    submit(&state, &theme, UserForm::from_input(None, input)).await
}

/// Update a user.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    theme: ThemeContext,
    Path(id): Path<UserId>,
    Form(input): Form<UserInput>,
) -> Response {
    submit(&state, &theme, UserForm::from_input(Some(id), input)).await
}

/// Validate, send, and either redirect to the list or re-render the modal.
async fn submit(state: &AppState, theme: &ThemeContext, mut form: UserForm) -> Response {
    let Some(submission) = form.submit() else {
        return render(
            state,
            theme,
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(user_modal(&form, None)),
            None,
        )
        .await;
    };

    let users = state.users();
    let result = match &submission {
        UserSubmission::Create(payload) => {
            users
                .mutate(users.resource().create(payload), |user| {
                    info!(user_id = %user.id, "User created");
                })
                .await
        }
        UserSubmission::Update(id, payload) => {
            users
                .mutate(users.resource().update(*id, payload), |user| {
                    info!(user_id = %user.id, "User updated");
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
                Some(user_modal(&form, Some(e.to_string()))),
                None,
            )
            .await
        }
    }
}

/// Delete a user once the prompt was confirmed.
///
/// Without `confirm=true` nothing is sent and the browser is sent to the
/// prompt instead.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    theme: ThemeContext,
    Path(id): Path<UserId>,
    Form(form): Form<DeleteForm>,
) -> Response {
    if !form.is_confirmed() {
        return Redirect::to(&delete_prompt_href(LIST_HREF, id)).into_response();
    }

    let users = state.users();
    let Some(guard) = users.begin_delete(id) else {
        let what = describe(&state, id).await;
        let confirm = ConfirmView::delete(LIST_HREF, &what, id, true);
        return render(&state, &theme, StatusCode::CONFLICT, None, Some(confirm)).await;
    };

    let result = users
        .mutate(users.resource().delete(id), |()| {
            info!(user_id = %id, "User deleted");
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
