//! `/users` resource client.

use backoffice_core::UserId;
use tracing::instrument;

use super::{BackendClient, BackendError, User, UserCreate, UserUpdate};

/// Client for the backend's `/users` endpoints.
#[derive(Clone)]
pub struct UsersApi {
    client: BackendClient,
}

impl UsersApi {
    pub(super) const fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, BackendError> {
        self.client.get("users").await
    }

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Status`] with 404 if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: UserId) -> Result<User, BackendError> {
        self.client.get(&format!("users/{id}")).await
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &UserCreate) -> Result<User, BackendError> {
        self.client.post("users", payload).await
    }

    /// Replace a user's fields. Omitting the password leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the payload is rejected.
    #[instrument(skip(self, payload), fields(user_id = %id))]
    pub async fn update(&self, id: UserId, payload: &UserUpdate) -> Result<User, BackendError> {
        self.client.put(&format!("users/{id}"), payload).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: UserId) -> Result<(), BackendError> {
        self.client.delete(&format!("users/{id}")).await
    }
}
