//! REST backend client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; no envelope around request or
//!   response bodies
//! - Every call is a single attempt: no retries, no timeout override, no
//!   caching (caching lives in [`crate::query`])
//! - Failures are returned unchanged to the caller as [`BackendError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use backoffice_admin::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend);
//!
//! let users = client.users().list().await?;
//! let product = client.products().get(ProductId::new(1)).await?;
//! ```

mod client;
mod products;
pub mod types;
mod users;

pub use client::BackendClient;
pub use products::ProductsApi;
pub use types::*;
pub use users::UsersApi;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connection refused, reset, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Status code returned by the backend.
        status: u16,
        /// The backend's `detail` message, or the start of the body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BackendError {
    /// Returns `true` if the backend reported that the record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = BackendError::Status {
            status: 404,
            message: "User not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: User not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_status_is_not_not_found() {
        let err = BackendError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_not_found());
    }
}
