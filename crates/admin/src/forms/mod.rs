//! Create/edit forms for users and products.
//!
//! A form holds the raw draft text exactly as typed. Nothing is parsed or
//! checked while editing; [`UserForm::submit`] / [`ProductForm::submit`]
//! validate every field at once and only hand out a typed submission when
//! all of them pass.
//!
//! ```text
//! draft ──submit──► validate ──ok──► Submission (payload for the backend)
//!   ▲                  │
//!   └── set(field) ◄───┴─err──► FieldErrors (all failing fields)
//! ```

mod product;
mod user;

pub use product::{ProductField, ProductForm, ProductInput, ProductSubmission};
pub use user::{UserField, UserForm, UserInput, UserSubmission};

use std::collections::BTreeMap;

use backoffice_core::{EmailError, PriceError};
use thiserror::Error;

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Empty after trimming.
    #[error("This field is required")]
    Required,

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Errors of one submit attempt, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F> {
    errors: BTreeMap<F, FieldError>,
}

impl<F> Default for FieldErrors<F> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: Ord + Copy> FieldErrors<F> {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: F, error: FieldError) {
        self.errors.insert(field, error);
    }

    /// Drop the error of one field, if any.
    pub fn clear(&mut self, field: F) {
        self.errors.remove(&field);
    }

    #[must_use]
    pub fn get(&self, field: F) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    /// User-facing message for one field.
    #[must_use]
    pub fn message(&self, field: F) -> Option<String> {
        self.get(field).map(ToString::to_string)
    }

    #[must_use]
    pub fn contains(&self, field: F) -> bool {
        self.errors.contains_key(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Failing fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.errors.keys().copied()
    }
}

/// Trimmed value of a required text field.
fn required(value: &str) -> Result<&str, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FieldError::Required)
    } else {
        Ok(trimmed)
    }
}

// =============================================================================
// Template views
// =============================================================================

/// Kind of input control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Password,
    Number,
    TextArea,
    Checkbox,
}

impl InputKind {
    /// The `type` attribute of the `<input>` element.
    #[must_use]
    pub const fn html_type(self) -> &'static str {
        match self {
            Self::Text | Self::TextArea => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
        }
    }

    #[must_use]
    pub const fn is_textarea(self) -> bool {
        matches!(self, Self::TextArea)
    }

    #[must_use]
    pub const fn is_checkbox(self) -> bool {
        matches!(self, Self::Checkbox)
    }
}

/// One form field as the modal template renders it.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
    pub hint: Option<&'static str>,
    pub error: Option<String>,
}

impl FieldView {
    fn text(name: &'static str, label: &'static str, kind: InputKind, value: &str) -> Self {
        Self {
            name,
            label,
            kind,
            value: value.to_string(),
            checked: false,
            hint: None,
            error: None,
        }
    }

    fn checkbox(name: &'static str, label: &'static str, checked: bool) -> Self {
        Self {
            name,
            label,
            kind: InputKind::Checkbox,
            value: "true".to_string(),
            checked,
            hint: None,
            error: None,
        }
    }

    fn with_hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}
