//! Integration tests for Backoffice.
//!
//! Every test starts its own in-memory REST backend ([`FakeBackend`]) and an
//! admin server pointed at it, both on ephemeral ports. Nothing has to be
//! running beforehand.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p backoffice-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use backoffice_integration_tests::TestContext;
//!
//! #[tokio::test]
//! async fn test_users_page() {
//!     let ctx = TestContext::start().await;
//!     ctx.backend.insert_user("Ada", "ada@example.com");
//!
//!     let (status, body) = ctx.get_text("/users").await;
//!     assert_eq!(status, 200);
//!     assert!(body.contains("ada@example.com"));
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use reqwest::{Client, Response, redirect::Policy};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;

use backoffice_admin::{
    config::{AdminConfig, BackendConfig},
    state::AppState,
};

/// Timestamp given to every user the fake backend creates.
pub const CREATED_AT: &str = "2024-05-01T12:00:00";

// =============================================================================
// Fake backend
// =============================================================================

/// One request received by the fake backend.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

type Table = Mutex<BTreeMap<i64, Value>>;
type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
struct FakeBackendInner {
    users: Table,
    products: Table,
    next_id: AtomicI64,
    calls: Mutex<Vec<Call>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-memory stand-in for the REST backend.
///
/// Speaks the same routes and error shape (`{"detail": "..."}`), never
/// returns passwords, and records every call so tests can assert on what
/// the admin did or did not send.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<FakeBackendInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn detail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "detail": message })))
}

fn not_found(collection: &str) -> Reply {
    let noun = match collection {
        "users" => "User",
        "products" => "Product",
        _ => "Resource",
    };
    detail(StatusCode::NOT_FOUND, &format!("{noun} not found"))
}

fn unavailable() -> Reply {
    detail(StatusCode::INTERNAL_SERVER_ERROR, "Backend unavailable")
}

impl FakeBackend {
    /// The backend's HTTP routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/{collection}", get(list).post(create))
            .route(
                "/{collection}/{id}",
                get(fetch).put(update).delete(remove),
            )
            .with_state(self.clone())
    }

    fn table(&self, collection: &str) -> Option<&Table> {
        match collection {
            "users" => Some(&self.inner.users),
            "products" => Some(&self.inner.products),
            _ => None,
        }
    }

    fn next_id(&self) -> i64 {
        self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn record(&self, method: &str, path: String, body: Option<Value>) {
        lock(&self.inner.calls).push(Call {
            method: method.to_string(),
            path,
            body,
        });
    }

    /// Number of calls received for `method` on exactly `path`.
    pub fn calls(&self, method: &str, path: &str) -> usize {
        lock(&self.inner.calls)
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    /// Body of the most recent `method` call on `path`.
    pub fn last_body(&self, method: &str, path: &str) -> Option<Value> {
        lock(&self.inner.calls)
            .iter()
            .rev()
            .find(|call| call.method == method && call.path == path)
            .and_then(|call| call.body.clone())
    }

    /// Make every `GET` on a collection or record fail with 500.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every create, update, and delete fail with 500.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store a user directly, bypassing the HTTP routes. Returns its id.
    pub fn insert_user(&self, name: &str, email: &str) -> i64 {
        let id = self.next_id();
        let user = json!({ "id": id, "name": name, "email": email, "created_at": CREATED_AT });
        lock(&self.inner.users).insert(id, user);
        id
    }

    /// Store a product directly, bypassing the HTTP routes. Returns its id.
    pub fn insert_product(&self, name: &str, price: f64) -> i64 {
        let id = self.next_id();
        let product = json!({
            "id": id,
            "name": name,
            "description": format!("{name} description"),
            "price": price,
            "category": "general",
            "tags": ["sample"],
            "in_stock": true,
        });
        lock(&self.inner.products).insert(id, product);
        id
    }

    /// Current record, as the backend would return it.
    pub fn record_of(&self, collection: &str, id: i64) -> Option<Value> {
        self.table(collection)
            .and_then(|table| lock(table).get(&id).cloned())
    }
}

/// Copy writable fields from `body` into `record`. Passwords are accepted
/// but never stored in a readable record.
fn apply(record: &mut Map<String, Value>, body: Value) {
    if let Value::Object(fields) = body {
        for (key, value) in fields {
            if key != "id" && key != "password" && key != "created_at" {
                record.insert(key, value);
            }
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list(
    State(backend): State<FakeBackend>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<Value>>, Reply> {
    backend.record("GET", format!("/{collection}"), None);
    let table = backend.table(&collection).ok_or_else(|| not_found(&collection))?;
    if backend.inner.fail_reads.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    Ok(Json(lock(table).values().cloned().collect()))
}

async fn fetch(
    State(backend): State<FakeBackend>,
    Path((collection, id)): Path<(String, i64)>,
) -> Result<Json<Value>, Reply> {
    backend.record("GET", format!("/{collection}/{id}"), None);
    let table = backend.table(&collection).ok_or_else(|| not_found(&collection))?;
    if backend.inner.fail_reads.load(Ordering::SeqCst) {
        return Err(unavailable());
    }
    lock(table)
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(&collection))
}

async fn create(
    State(backend): State<FakeBackend>,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<Reply, Reply> {
    backend.record("POST", format!("/{collection}"), Some(body.clone()));
    let table = backend.table(&collection).ok_or_else(|| not_found(&collection))?;
    if backend.inner.fail_writes.load(Ordering::SeqCst) {
        return Err(unavailable());
    }

    let id = backend.next_id();
    let mut record = Map::new();
    record.insert("id".to_string(), json!(id));
    if collection == "users" {
        record.insert("created_at".to_string(), json!(CREATED_AT));
    }
    apply(&mut record, body);

    let record = Value::Object(record);
    lock(table).insert(id, record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update(
    State(backend): State<FakeBackend>,
    Path((collection, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reply> {
    backend.record("PUT", format!("/{collection}/{id}"), Some(body.clone()));
    let table = backend.table(&collection).ok_or_else(|| not_found(&collection))?;
    if backend.inner.fail_writes.load(Ordering::SeqCst) {
        return Err(unavailable());
    }

    let mut records = lock(table);
    let Some(Value::Object(record)) = records.get_mut(&id) else {
        return Err(not_found(&collection));
    };
    apply(record, body);
    Ok(Json(Value::Object(record.clone())))
}

async fn remove(
    State(backend): State<FakeBackend>,
    Path((collection, id)): Path<(String, i64)>,
) -> Result<Json<Value>, Reply> {
    backend.record("DELETE", format!("/{collection}/{id}"), None);
    let table = backend.table(&collection).ok_or_else(|| not_found(&collection))?;
    if backend.inner.fail_writes.load(Ordering::SeqCst) {
        return Err(unavailable());
    }

    lock(table)
        .remove(&id)
        .map(|_| Json(json!({ "detail": "Deleted" })))
        .ok_or_else(|| not_found(&collection))
}

// =============================================================================
// Test context
// =============================================================================

/// A running admin wired to a fresh [`FakeBackend`].
pub struct TestContext {
    pub backend: FakeBackend,
    pub admin_url: String,
    /// Keeps cookies between requests and never follows redirects.
    pub client: Client,
}

impl TestContext {
    /// Start the fake backend and the admin on ephemeral ports.
    ///
    /// # Panics
    ///
    /// Panics if a listener cannot be bound.
    pub async fn start() -> Self {
        let backend = FakeBackend::default();
        let backend_url = serve(backend.router()).await;

        let backend_config = BackendConfig::new(&backend_url).expect("valid backend URL");
        let state = AppState::new(AdminConfig::local(backend_config));
        let admin_url = serve(backoffice_admin::app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            backend,
            admin_url,
            client,
        }
    }

    /// Absolute admin URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    /// `GET` an admin page.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// `GET` an admin page and read its body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent or the body read.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        text(self.get(path).await).await
    }

    /// `POST` a urlencoded form to the admin.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }
}

/// Status and body of a response.
///
/// # Panics
///
/// Panics if the body cannot be read.
pub async fn text(response: Response) -> (StatusCode, String) {
    let status = StatusCode::from_u16(response.status().as_u16()).expect("valid status code");
    let body = response.text().await.expect("Failed to read response");
    (status, body)
}

/// `Location` header of a redirect.
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}
