//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Share it as `Arc<EventBus>`; every subscriber sees every event published
//! after it subscribed.

use chrono::{DateTime, Utc};
use scrumboard_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Something that happened to a sprint or a retrospective session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated name, see [`crate::names`].
    pub event_type: String,

    /// Kind of the entity the event is about (e.g. `"sprint"`).
    pub source_entity_type: Option<String>,

    pub source_entity_id: Option<DbId>,

    /// Account that caused the event, when there is one.
    pub actor_user_id: Option<DbId>,

    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// An event with no source, no actor and an empty object payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::json!({}),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out bus for [`DomainEvent`]s.
///
/// ```rust
/// use scrumboard_events::bus::{DomainEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// bus.publish(DomainEvent::new("retrospective.session_provisioned"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` unread events per subscriber.
    /// Slower subscribers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to every current subscriber. Dropped if there are none.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;

    #[tokio::test]
    async fn test_provisioned_event_reaches_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            DomainEvent::new(names::SESSION_PROVISIONED)
                .with_source(names::SPRINT_ENTITY, 12)
                .with_actor(3)
                .with_payload(serde_json::json!({"retrospective_url": "/retrospective?rtName=a&rtPwd=b"})),
        );

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, names::SESSION_PROVISIONED);
        assert_eq!(received.source_entity_type.as_deref(), Some("sprint"));
        assert_eq!(received.source_entity_id, Some(12));
        assert_eq!(received.actor_user_id, Some(3));
        assert_eq!(
            received.payload["retrospective_url"],
            "/retrospective?rtName=a&rtPwd=b"
        );
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(DomainEvent::new(names::ROOM_EVICTED));

        assert_eq!(first.recv().await.unwrap().event_type, names::ROOM_EVICTED);
        assert_eq!(second.recv().await.unwrap().event_type, names::ROOM_EVICTED);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::new(names::PARTICIPANT_LEFT));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_small_buffer_lags_slow_subscriber() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..3 {
            bus.publish(DomainEvent::new(names::PARTICIPANT_JOINED));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
    }

    #[test]
    fn test_bare_event_defaults() {
        let event = DomainEvent::new(names::PARTICIPANT_JOINED);
        assert!(event.source_entity_type.is_none());
        assert!(event.actor_user_id.is_none());
        assert_eq!(event.payload, serde_json::json!({}));
    }
}
