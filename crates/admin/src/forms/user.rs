//! User create/edit form.

use backoffice_core::{Email, UserId};
use serde::Deserialize;

use super::{FieldError, FieldErrors, FieldView, InputKind, required};
use crate::backend::{User, UserCreate, UserUpdate};

/// Editable fields of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserField {
    Name,
    Email,
    Password,
}

/// Raw form body as posted by the browser.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A validated user form, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSubmission {
    Create(UserCreate),
    Update(UserId, UserUpdate),
}

enum Shape {
    Create(String),
    Update(UserId, Option<String>),
}

/// Draft state of the user modal.
///
/// Built empty for creation or from an existing record for editing. The
/// password is never pre-filled; in edit mode leaving it blank keeps the
/// stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    target: Option<UserId>,
    name: String,
    email: String,
    password: String,
    errors: FieldErrors<UserField>,
}

impl Default for UserForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UserForm {
    /// Empty form in create mode.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: None,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            errors: FieldErrors::new(),
        }
    }

    /// Form in edit mode, pre-filled from `user`.
    #[must_use]
    pub fn edit(user: &User) -> Self {
        Self {
            target: Some(user.id),
            name: user.name.clone(),
            email: user.email.to_string(),
            ..Self::new()
        }
    }

    /// Form holding a posted body. `target` selects edit mode.
    #[must_use]
    pub fn from_input(target: Option<UserId>, input: UserInput) -> Self {
        Self {
            target,
            name: input.name,
            email: input.email,
            password: input.password,
            errors: FieldErrors::new(),
        }
    }

    /// Record being edited, `None` in create mode.
    #[must_use]
    pub const fn target(&self) -> Option<UserId> {
        self.target
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.target.is_some()
    }

    /// Current draft text of a field.
    #[must_use]
    pub fn value(&self, field: UserField) -> &str {
        match field {
            UserField::Name => &self.name,
            UserField::Email => &self.email,
            UserField::Password => &self.password,
        }
    }

    /// Replace a field's draft text and clear that field's error.
    ///
    /// Other fields' errors stay until the next submit.
    pub fn set(&mut self, field: UserField, value: impl Into<String>) {
        let value = value.into();
        match field {
            UserField::Name => self.name = value,
            UserField::Email => self.email = value,
            UserField::Password => self.password = value,
        }
        self.errors.clear(field);
    }

    /// Errors of the last submit attempt, minus fields edited since.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors<UserField> {
        &self.errors
    }

    /// Check every field without touching the draft.
    ///
    /// # Errors
    ///
    /// Returns all failing fields at once.
    pub fn validate(&self) -> Result<UserSubmission, FieldErrors<UserField>> {
        let mut errors = FieldErrors::new();

        let name = required(&self.name)
            .map_err(|e| errors.insert(UserField::Name, e))
            .ok();

        let email = required(&self.email)
            .and_then(|email| Email::parse(email).map_err(FieldError::from))
            .map_err(|e| errors.insert(UserField::Email, e))
            .ok();

        // A blank password is dropped in both modes, but creation needs one.
        let password = match self.password.trim() {
            "" => None,
            _ => Some(self.password.clone()),
        };
        let shape = match (self.target, password) {
            (Some(id), password) => Some(Shape::Update(id, password)),
            (None, Some(password)) => Some(Shape::Create(password)),
            (None, None) => {
                errors.insert(UserField::Password, FieldError::Required);
                None
            }
        };

        match (name, email, shape) {
            (Some(name), Some(email), Some(shape)) => {
                let name = name.to_string();
                Ok(match shape {
                    Shape::Create(password) => UserSubmission::Create(UserCreate {
                        name,
                        email,
                        password,
                    }),
                    Shape::Update(id, password) => {
                        UserSubmission::Update(id, UserUpdate { name, email, password })
                    }
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate and record the outcome.
    ///
    /// On failure every failing field's error is stored and `None` is
    /// returned, so nothing can be sent.
    pub fn submit(&mut self) -> Option<UserSubmission> {
        match self.validate() {
            Ok(submission) => {
                self.errors = FieldErrors::new();
                Some(submission)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Fields in display order for the modal template.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldView> {
        let password = FieldView::text(
            "password",
            "Password",
            InputKind::Password,
            &self.password,
        );
        let password = if self.is_edit() {
            password.with_hint("Leave blank to keep the current password")
        } else {
            password
        };

        vec![
            FieldView::text("name", "Name", InputKind::Text, &self.name)
                .with_error(self.errors.message(UserField::Name)),
            FieldView::text("email", "Email", InputKind::Email, &self.email)
                .with_error(self.errors.message(UserField::Email)),
            password.with_error(self.errors.message(UserField::Password)),
        ]
    }
}
