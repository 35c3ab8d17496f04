//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, ProductsApi, UsersApi};
use crate::config::AdminConfig;
use crate::query::{QueryCache, QueryKey};

/// Application state shared across all handlers.
///
/// Cheap to clone; every clone sees the same caches.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
    users: QueryCache<UsersApi>,
    products: QueryCache<ProductsApi>,
}

impl AppState {
    /// Build the state: one backend client and one query cache per entity.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let backend = BackendClient::new(&config.backend);
        let users = QueryCache::new(backend.users(), &config.cache);
        let products = QueryCache::new(backend.products(), &config.cache);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                users,
                products,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Cached `/users` collection.
    #[must_use]
    pub fn users(&self) -> &QueryCache<UsersApi> {
        &self.inner.users
    }

    /// Cached `/products` collection.
    #[must_use]
    pub fn products(&self) -> &QueryCache<ProductsApi> {
        &self.inner.products
    }

    /// Number of observers of a collection.
    #[must_use]
    pub fn observer_count(&self, key: QueryKey) -> usize {
        match key {
            QueryKey::Users => self.users().observer_count(),
            QueryKey::Products => self.products().observer_count(),
        }
    }
}
