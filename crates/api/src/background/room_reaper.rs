//! Periodic eviction of empty retrospective rooms.
//!
//! Rooms keep the whole board in memory. Once the last participant leaves,
//! a room is kept for the configured idle period (a stored join URL can
//! still bring people back) and then dropped.

use std::sync::Arc;
use std::time::Duration;

use scrumboard_core::retrospective::ROOM_REAPER_INTERVAL_SECS;
use scrumboard_events::{names, DomainEvent, EventBus};
use tokio_util::sync::CancellationToken;

use crate::rooms::RoomRegistry;

/// Run the reaper loop until `cancel` is triggered.
pub async fn run(
    rooms: Arc<RoomRegistry>,
    event_bus: Arc<EventBus>,
    max_idle: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        max_idle_secs = max_idle.as_secs(),
        interval_secs = ROOM_REAPER_INTERVAL_SECS,
        "Room reaper started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(ROOM_REAPER_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Room reaper stopping");
                break;
            }
            _ = interval.tick() => {
                let evicted = rooms.evict_idle(max_idle).await;
                if evicted.is_empty() {
                    tracing::debug!("Room reaper: nothing to evict");
                    continue;
                }
                tracing::info!(count = evicted.len(), "Room reaper: evicted idle rooms");
                for session in evicted {
                    event_bus.publish(
                        DomainEvent::new(names::ROOM_EVICTED)
                            .with_payload(serde_json::json!({ "session": session })),
                    );
                }
            }
        }
    }
}
