//! Backend health probe.

use tracing::info;

/// Call the backend's `/health` endpoint once.
///
/// # Errors
///
/// Returns an error if the backend URL is missing or invalid, or if the
/// backend does not answer with a success status.
pub async fn health(backend_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let client = super::backend_client(backend_url)?;

    info!(backend = %client.base_url(), "Checking backend health");
    client.health().await?;
    info!("Backend is healthy");

    Ok(())
}
