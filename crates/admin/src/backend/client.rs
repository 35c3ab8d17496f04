//! HTTP plumbing shared by the resource clients.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{BackendError, ProductsApi, UsersApi};
use crate::config::BackendConfig;

/// Maximum number of body characters carried into an error message.
const ERROR_BODY_LIMIT: usize = 200;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the REST backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
            }),
        }
    }

    /// Resource client for `/users`.
    #[must_use]
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Resource client for `/products`.
    #[must_use]
    pub fn products(&self) -> ProductsApi {
        ProductsApi::new(self.clone())
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Probe the backend's `/health` endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), BackendError> {
        let response = self.inner.client.get(self.url("health")).send().await?;
        read_body(response).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    pub(super) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        decode(response).await
    }

    pub(super) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    pub(super) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    pub(super) async fn delete(&self, path: &str) -> Result<(), BackendError> {
        let response = self.inner.client.delete(self.url(path)).send().await?;
        read_body(response).await.map(|_| ())
    }
}

// =============================================================================
// Response handling
// =============================================================================

/// Read the body, turning non-success statuses into [`BackendError::Status`].
async fn read_body(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        debug!(status = %status, body = %truncate(&body), "Backend returned non-success status");
        return Err(BackendError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(body)
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(&body),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

/// Pull a readable message out of an error body.
///
/// The backend reports failures as `{"detail": "..."}`, or as a list of
/// `{"msg": "..."}` objects for request validation errors.
fn error_message(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());

    match detail {
        Some(serde_json::Value::String(message)) => message,
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if messages.is_empty() {
                truncate(body)
            } else {
                messages.join("; ")
            }
        }
        _ => truncate(body),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}
