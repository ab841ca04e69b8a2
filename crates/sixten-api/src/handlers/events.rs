//! Server-Sent Events stream of domain events.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
};
use tokio_stream::StreamExt as _;

use sixten_core::EventEnvelope;

use crate::AppState;

/// SSE event stream handler.
///
/// Clients connect to `/api/events` and receive every event for the
/// configured owner, named by its namespaced type (`link.created`, ...).
/// Lagged receivers skip what they missed.
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_bus.subscribe();
    let owner = state.owner.as_str().to_string();

    tracing::debug!(
        subsystem = "api",
        component = "events",
        subscribers = state.event_bus.subscriber_count(),
        "SSE client connected"
    );

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(
        move |result: Result<EventEnvelope, _>| match result {
            Ok(envelope) => {
                if envelope.owner.as_deref().is_some_and(|o| o != owner) {
                    return None;
                }
                let event_type = envelope.event_type.clone();
                match serde_json::to_string(&envelope) {
                    Ok(json) => Some(Ok(Event::default()
                        .id(envelope.event_id.to_string())
                        .event(event_type)
                        .data(json))),
                    Err(_) => None,
                }
            }
            Err(_) => None,
        },
    );

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("keepalive"),
    )
}
