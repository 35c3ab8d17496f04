//! CLI command implementations.

pub mod check;
pub mod seed;

use backoffice_admin::backend::BackendClient;
use backoffice_admin::config::{BackendConfig, ConfigError};

/// Build a backend client from an explicit URL, falling back to `BACKEND_URL`.
fn backend_client(url: Option<&str>) -> Result<BackendClient, ConfigError> {
    let config = match url {
        Some(url) => BackendConfig::new(url)?,
        None => BackendConfig::from_env()?,
    };
    Ok(BackendClient::new(&config))
}
