//! Server-sent change notifications for a cached collection.
//!
//! Each open list page subscribes here, which makes it an observer of the
//! collection: invalidations then trigger a background refetch, and the page
//! reloads its table when the `refreshed` event arrives. A page that connects
//! while a fetch is running first gets an `invalidated` event so it shows
//! the loading state.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, instrument, warn};

use crate::{
    error::AppError,
    query::{QueryEvent, QueryKey},
    state::AppState,
};

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new().route("/events/{key}", get(stream))
}

/// `GET /events/{key}` - SSE stream of [`crate::query::QueryEvent`]s.
#[instrument(skip(state))]
pub async fn stream(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let key = QueryKey::from_name(&key)
        .ok_or_else(|| AppError::NotFound(format!("collection '{key}'")))?;

    let (mut events, loading) = match key {
        QueryKey::Users => (
            state.users().subscribe(),
            state.users().fetch_status().is_loading(),
        ),
        QueryKey::Products => (
            state.products().subscribe(),
            state.products().fetch_status().is_loading(),
        ),
    };
    debug!(%key, observers = state.observer_count(key), loading, "Observer subscribed");

    let sse_stream = async_stream::stream! {
        if loading {
            if let Some(event) = to_sse(&QueryEvent::Invalidated { key }) {
                yield Ok(event);
            }
        }
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(sse_event) = to_sse(&event) {
                        yield Ok(sse_event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(%key, skipped, "Observer lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

fn to_sse(event: &QueryEvent) -> Option<Event> {
    Event::default()
        .event(event.name())
        .json_data(event)
        .map_err(|e| warn!(error = %e, "Failed to encode query event"))
        .ok()
}
