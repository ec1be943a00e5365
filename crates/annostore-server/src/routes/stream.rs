//! Server-Sent Events endpoint for annotation notifications.
//!
//! Endpoint: GET /stream
//!
//! # Event Types
//!
//! - `create` / `update` / `delete`: published after the corresponding
//!   mutation commits; delete events carry the pre-deletion snapshot
//! - `heartbeat`: sent every 30 seconds to keep the connection alive
//! - `catchup`: sent when the client falls behind the broadcast buffer
//!
//! # Example
//!
//! ```text
//! event: create
//! data: {"action":"create","id":"...","timestamp":"..."}
//!
//! event: heartbeat
//! data: {"timestamp":"2024-01-01T00:00:00Z"}
//! ```

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use chrono::Utc;
use futures::stream::{self, Stream};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use crate::events::HEARTBEAT_INTERVAL_SECS;
use crate::state::AppState;

/// GET /stream - Subscribe to annotation events.
///
/// Returns a Server-Sent Events stream (Content-Type: text/event-stream)
/// that emits an event per committed mutation. If a client falls behind
/// the broadcast buffer, a `catchup` event reports how many events were
/// dropped; the client should re-query the search endpoint to sync.
async fn subscribe_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.broadcaster().subscribe();

    tracing::info!("Client subscribed to SSE events");

    let event_stream = stream::unfold(receiver, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let event_type = event.action.as_str();
                    match serde_json::to_string(&event) {
                        Ok(data) => {
                            let sse_event = Event::default().event(event_type).data(data);
                            return Some((Ok(sse_event), rx));
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize event");
                            continue;
                        }
                    }
                }
                Err(RecvError::Lagged(count)) => {
                    // Client fell behind the broadcast buffer.
                    tracing::warn!(events_missed = count, "SSE client lagged");

                    let data = json!({
                        "events_missed": count,
                        "timestamp": Utc::now(),
                    })
                    .to_string();
                    let sse_event = Event::default().event("catchup").data(data);
                    return Some((Ok(sse_event), rx));
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("Event channel closed, ending SSE stream");
                    return None;
                }
            }
        }
    });

    let keep_alive = KeepAlive::new()
        .interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS))
        .event(
            Event::default()
                .event("heartbeat")
                .data(json!({"timestamp": Utc::now()}).to_string()),
        );

    Sse::new(event_stream).keep_alive(keep_alive)
}

/// Build SSE event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/stream", get(subscribe_events))
}
