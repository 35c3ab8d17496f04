//! `/products` resource client.

use backoffice_core::ProductId;
use tracing::instrument;

use super::{BackendClient, BackendError, Product, ProductPayload};

/// Client for the backend's `/products` endpoints.
#[derive(Clone)]
pub struct ProductsApi {
    client: BackendClient,
}

impl ProductsApi {
    pub(super) const fn new(client: BackendClient) -> Self {
        Self { client }
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, BackendError> {
        self.client.get("products").await
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Status`] with 404 if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Product, BackendError> {
        self.client.get(&format!("products/{id}")).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create(&self, payload: &ProductPayload) -> Result<Product, BackendError> {
        self.client.post("products", payload).await
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the payload is rejected.
    #[instrument(skip(self, payload), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, BackendError> {
        self.client.put(&format!("products/{id}"), payload).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), BackendError> {
        self.client.delete(&format!("products/{id}")).await
    }
}
