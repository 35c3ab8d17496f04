//! Cache/query layer between the pages and the resource clients.
//!
//! One [`QueryCache`] per entity holds the fetched collection in memory
//! (via `moka`), shares a single in-flight fetch between concurrent callers,
//! and invalidates + refetches after successful mutations. Observers (the
//! SSE stream behind each list page) learn about changes through
//! [`QueryEvent`]s.
//!
//! ```rust,ignore
//! let users = QueryCache::new(client.users(), &config.cache);
//!
//! let records = users.fetch().await?;
//! users
//!     .mutate(client.users().delete(id), |()| tracing::info!("deleted"))
//!     .await?;
//! ```

mod cache;

pub use cache::{DeleteGuard, QueryCache};

use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;

use serde::Serialize;

use backoffice_core::{ProductId, UserId};

use crate::backend::{BackendError, Product, ProductsApi, User, UsersApi};

/// Logical name of a cached collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKey {
    Users,
    Products,
}

impl QueryKey {
    /// The key as it appears in URLs and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
        }
    }

    /// Parse a key from its URL form.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "users" => Some(Self::Users),
            "products" => Some(Self::Products),
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection the query layer knows how to load.
pub trait Resource: Send + Sync + 'static {
    /// Record identifier.
    type Id: Copy + Eq + Hash + Display + Send + Sync + 'static;
    /// Record type held in the collection.
    type Record: Clone + Send + Sync + 'static;

    /// Cache key of the collection.
    const KEY: QueryKey;

    /// Load the whole collection from the backend.
    fn load(&self) -> impl Future<Output = Result<Vec<Self::Record>, BackendError>> + Send;
}

impl Resource for UsersApi {
    type Id = UserId;
    type Record = User;

    const KEY: QueryKey = QueryKey::Users;

    fn load(&self) -> impl Future<Output = Result<Vec<User>, BackendError>> + Send {
        self.list()
    }
}

impl Resource for ProductsApi {
    type Id = ProductId;
    type Record = Product;

    const KEY: QueryKey = QueryKey::Products;

    fn load(&self) -> impl Future<Output = Result<Vec<Product>, BackendError>> + Send {
        self.list()
    }
}

/// Change notification sent to observers of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryEvent {
    /// Cached data was marked stale.
    Invalidated { key: QueryKey },
    /// A fetch completed and the cache holds `count` records.
    Refreshed { key: QueryKey, count: usize },
    /// A fetch failed.
    Failed { key: QueryKey, message: String },
}

impl QueryEvent {
    /// SSE event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Invalidated { .. } => "invalidated",
            Self::Refreshed { .. } => "refreshed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// State of the most recent fetch of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready { count: usize },
    Failed(String),
}

impl FetchStatus {
    /// Returns `true` while a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// State of the most recent mutation of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Failed(String),
}

impl MutationStatus {
    /// Returns `true` while a mutation is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}
