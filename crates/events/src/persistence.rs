//! Writes every published [`DomainEvent`] to the `events` table.

use scrumboard_core::types::DbId;
use scrumboard_db::repositories::EventRepo;
use scrumboard_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::DomainEvent;

/// Long-lived subscriber that persists events. Exits when the bus is dropped.
pub struct EventPersistence;

impl EventPersistence {
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => match Self::persist(&pool, &event).await {
                    Ok(Some(id)) => {
                        tracing::debug!(event_id = id, event_type = %event.event_type, "Event persisted");
                    }
                    Ok(None) => {
                        tracing::warn!(event_type = %event.event_type, "Unknown event type, not persisted");
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event persistence lagged behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Returns `None` when the event name has no `event_types` row.
    async fn persist(pool: &DbPool, event: &DomainEvent) -> Result<Option<DbId>, sqlx::Error> {
        let Some(event_type) = EventRepo::get_event_type_by_name(pool, &event.event_type).await?
        else {
            return Ok(None);
        };

        EventRepo::insert(
            pool,
            event_type.id,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_user_id,
            &event.payload,
        )
        .await
        .map(Some)
    }
}
