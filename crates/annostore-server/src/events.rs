//! Event publication for annotation mutations.
//!
//! Exactly one event is published per successful mutating request, and
//! only after the database transaction has committed. Handlers stage
//! events on a [`PostCommit`] queue tied to the request's transaction;
//! the queue fires on commit and is discarded (with the transaction
//! rolled back) on any earlier failure.
//!
//! Downstream consumers (the SSE stream route, and through it live
//! clients) subscribe via the [`EventBroadcaster`], a single
//! `tokio::sync::broadcast` channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use annostore_core::{Annotation, AnnotationAction, AnnotationId};
use annostore_store::{StoreResult, StoreTxn};

/// Default channel capacity for the broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Heartbeat interval in seconds for SSE keep-alive.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

// ============================================================================
// Event Types
// ============================================================================

/// A notification describing one annotation mutation.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationEvent {
    /// Which mutation happened.
    pub action: AnnotationAction,
    /// Id of the affected annotation.
    pub id: AnnotationId,
    /// Pre-deletion snapshot, present only for deletes. Consumers need
    /// the original fields (target URIs in particular) to route the
    /// event, since the record is no longer fetchable afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,
}

impl AnnotationEvent {
    /// Event for a freshly created annotation.
    pub fn create(id: AnnotationId) -> Self {
        Self::new(AnnotationAction::Create, id, None)
    }

    /// Event for an updated annotation, carrying the new state's id.
    pub fn update(id: AnnotationId) -> Self {
        Self::new(AnnotationAction::Update, id, None)
    }

    /// Event for a deleted annotation, carrying the full prior state.
    pub fn delete(annotation: Annotation) -> Self {
        Self::new(AnnotationAction::Delete, annotation.id, Some(annotation))
    }

    fn new(action: AnnotationAction, id: AnnotationId, annotation: Option<Annotation>) -> Self {
        Self {
            action,
            id,
            annotation,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Fan-out of annotation events to all connected subscribers.
#[derive(Debug)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<AnnotationEvent>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    /// Create a broadcaster with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a broadcaster with a custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all annotation events.
    pub fn subscribe(&self) -> broadcast::Receiver<AnnotationEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of receivers that saw the event; zero when
    /// nobody is listening, which is fine: events are fire-and-forget.
    pub fn publish(&self, event: AnnotationEvent) -> usize {
        match self.sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                tracing::trace!("No subscribers for annotation event");
                0
            }
        }
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

// ============================================================================
// Post-commit queue
// ============================================================================

/// Per-request event queue with post-commit semantics.
///
/// Handlers stage events while the transaction is open and hand both to
/// [`PostCommit::commit`]; events reach the broadcaster only once the
/// transaction has committed. Dropping the queue (the `?` failure path)
/// discards everything staged.
pub struct PostCommit {
    broadcaster: Arc<EventBroadcaster>,
    staged: Vec<AnnotationEvent>,
}

impl PostCommit {
    /// Create an empty queue bound to a broadcaster.
    pub fn new(broadcaster: Arc<EventBroadcaster>) -> Self {
        Self {
            broadcaster,
            staged: Vec::new(),
        }
    }

    /// Stage an event for publication after commit.
    pub fn stage(&mut self, event: AnnotationEvent) {
        self.staged.push(event);
    }

    /// Number of staged events.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Commit the transaction, then publish everything staged.
    ///
    /// If the commit fails, staged events are dropped with `self`.
    pub async fn commit(self, txn: StoreTxn) -> StoreResult<()> {
        txn.commit().await?;
        self.fire();
        Ok(())
    }

    /// Publish staged events immediately. Only `commit` should normally
    /// reach this; it is public for consumers managing their own
    /// transaction boundary.
    pub fn fire(self) {
        for event in self.staged {
            tracing::debug!(
                action = %event.action,
                annotation_id = %event.id,
                "Publishing annotation event"
            );
            self.broadcaster.publish(event);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_annotation() -> Annotation {
        Annotation {
            id: AnnotationId::new(),
            created: Utc::now(),
            updated: Utc::now(),
            userid: "acct:alice@example.com".into(),
            groupid: "__world__".into(),
            text: "note".into(),
            tags: vec![],
            shared: true,
            target_uri: "http://example.com/page".into(),
            target_selectors: serde_json::json!([]),
            references: vec![],
            extra: serde_json::json!({}),
            document: None,
        }
    }

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let broadcaster = EventBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        let id = AnnotationId::new();
        let count = broadcaster.publish(AnnotationEvent::create(id));
        assert_eq!(count, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.action, AnnotationAction::Create);
        assert_eq!(event.id, id);
        assert!(event.annotation.is_none());
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let broadcaster = EventBroadcaster::new();
        let count = broadcaster.publish(AnnotationEvent::update(AnnotationId::new()));
        assert_eq!(count, 0);
    }

    #[test]
    fn subscriber_count_tracks_receivers() {
        let broadcaster = EventBroadcaster::new();
        assert_eq!(broadcaster.subscriber_count(), 0);
        let _r1 = broadcaster.subscribe();
        let _r2 = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn delete_event_carries_snapshot() {
        let broadcaster = Arc::new(EventBroadcaster::new());
        let mut rx = broadcaster.subscribe();

        let ann = sample_annotation();
        let target = ann.target_uri.clone();

        let mut queue = PostCommit::new(broadcaster);
        queue.stage(AnnotationEvent::delete(ann));
        queue.fire();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.action, AnnotationAction::Delete);
        let snapshot = event.annotation.expect("delete carries the prior state");
        assert_eq!(snapshot.target_uri, target);
    }

    #[tokio::test]
    async fn dropped_queue_publishes_nothing() {
        let broadcaster = Arc::new(EventBroadcaster::new());
        let mut rx = broadcaster.subscribe();

        {
            let mut queue = PostCommit::new(broadcaster.clone());
            queue.stage(AnnotationEvent::create(AnnotationId::new()));
            assert_eq!(queue.staged_len(), 1);
            // Dropped without commit: the failure path.
        }

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn event_serialization_omits_missing_snapshot() {
        let event = AnnotationEvent::create(AnnotationId::new());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"action\":\"create\""));
        assert!(!json.contains("\"annotation\""));

        let event = AnnotationEvent::delete(sample_annotation());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"action\":\"delete\""));
        assert!(json.contains("\"annotation\""));
        assert!(json.contains("http://example.com/page"));
    }
}
