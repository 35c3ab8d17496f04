//! Pieces shared by the users and products pages.
//!
//! Both pages are one list plus at most one overlay, selected by the query
//! string:
//!
//! ```text
//! /users               list only
//! /users?modal=new     create modal
//! /users?edit=3        edit modal for record 3
//! /users?delete=3      delete confirmation for record 3
//! ```
//!
//! Closing an overlay is a link back to the bare list URL, which is also
//! where every successful mutation redirects.

use std::fmt::Display;
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode, header::SET_COOKIE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::backend::BackendError;
use crate::forms::FieldView;
use crate::theme::ThemeContext;

/// Query string of a list page.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub modal: Option<String>,
    pub edit: Option<i64>,
    pub delete: Option<i64>,
}

/// Which overlay a list page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay<Id> {
    None,
    Create,
    Edit(Id),
    ConfirmDelete(Id),
}

impl ListQuery {
    /// Delete prompts win over edits, edits over `modal=new`.
    #[must_use]
    pub fn overlay<Id: From<i64>>(&self) -> Overlay<Id> {
        if let Some(id) = self.delete {
            Overlay::ConfirmDelete(id.into())
        } else if let Some(id) = self.edit {
            Overlay::Edit(id.into())
        } else if self.modal.as_deref() == Some("new") {
            Overlay::Create
        } else {
            Overlay::None
        }
    }
}

/// Body of a delete request. Only `confirm=true` deletes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    pub confirm: Option<String>,
}

impl DeleteForm {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("true")
    }
}

// =============================================================================
// Views
// =============================================================================

/// The list part of a page: an error, or the rows (possibly none).
#[derive(Debug, Clone)]
pub struct ListView<Row> {
    pub key: &'static str,
    pub error: Option<String>,
    pub rows: Vec<Row>,
    /// A mutation of the collection is in flight; rows may be about to change.
    pub busy: bool,
}

impl<Row> ListView<Row> {
    /// Build from a cache fetch result.
    pub fn from_fetch<R>(
        key: &'static str,
        fetched: Result<Arc<Vec<R>>, Arc<BackendError>>,
        row: impl Fn(&R) -> Row,
    ) -> Self {
        match fetched {
            Ok(records) => Self {
                key,
                error: None,
                rows: records.iter().map(row).collect(),
                busy: false,
            },
            Err(e) => Self {
                key,
                error: Some(e.to_string()),
                rows: Vec::new(),
                busy: false,
            },
        }
    }

    #[must_use]
    pub fn with_busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The create/edit modal.
#[derive(Debug, Clone)]
pub struct ModalView {
    pub title: String,
    pub action: String,
    pub submit_label: &'static str,
    pub close_href: &'static str,
    pub fields: Vec<FieldView>,
    /// Failure of the last send, shown above the fields.
    pub form_error: Option<String>,
}

/// The delete confirmation prompt.
#[derive(Debug, Clone)]
pub struct ConfirmView {
    pub message: String,
    pub action: String,
    pub close_href: &'static str,
    /// A delete of this record is already running.
    pub pending: bool,
    pub error: Option<String>,
}

impl ConfirmView {
    #[must_use]
    pub fn delete(list_href: &'static str, what: &str, id: impl Display, pending: bool) -> Self {
        Self {
            message: format!("Delete {what}? This cannot be undone."),
            action: format!("{list_href}/{id}/delete"),
            close_href: list_href,
            pending,
            error: None,
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Attach `status` and any theme cookie to a rendered page.
pub fn respond(status: StatusCode, theme: &ThemeContext, page: impl IntoResponse) -> Response {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = theme.set_cookie() {
        headers.append(SET_COOKIE, cookie);
    }
    (status, headers, page).into_response()
}

/// `Location` target for a record's delete prompt.
#[must_use]
pub fn delete_prompt_href(list_href: &str, id: impl Display) -> String {
    format!("{list_href}?delete={id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(modal: Option<&str>, edit: Option<i64>, delete: Option<i64>) -> ListQuery {
        ListQuery {
            modal: modal.map(str::to_string),
            edit,
            delete,
        }
    }

    #[test]
    fn test_overlay_selection() {
        assert_eq!(query(None, None, None).overlay::<i64>(), Overlay::None);
        assert_eq!(query(Some("new"), None, None).overlay::<i64>(), Overlay::Create);
        assert_eq!(query(Some("other"), None, None).overlay::<i64>(), Overlay::None);
        assert_eq!(query(None, Some(3), None).overlay::<i64>(), Overlay::Edit(3));
        assert_eq!(
            query(Some("new"), Some(3), Some(4)).overlay::<i64>(),
            Overlay::ConfirmDelete(4)
        );
    }

    #[test]
    fn test_delete_needs_explicit_confirmation() {
        assert!(!DeleteForm::default().is_confirmed());
        assert!(
            !DeleteForm {
                confirm: Some("yes".to_string())
            }
            .is_confirmed()
        );
        assert!(
            DeleteForm {
                confirm: Some("true".to_string())
            }
            .is_confirmed()
        );
    }

    #[test]
    fn test_list_view_from_error() {
        let fetched: Result<Arc<Vec<u8>>, _> = Err(Arc::new(BackendError::Status {
            status: 503,
            message: "down".to_string(),
        }));
        let view = ListView::from_fetch("users", fetched, |n| *n);
        assert_eq!(view.error.as_deref(), Some("HTTP 503: down"));
        assert!(view.is_empty());
    }

    #[test]
    fn test_confirm_view_targets_delete_route() {
        let view = ConfirmView::delete("/users", "user Ada", 3, false);
        assert_eq!(view.action, "/users/3/delete");
        assert_eq!(view.close_href, "/users");
        assert_eq!(delete_prompt_href("/users", 3), "/users?delete=3");
    }
}
