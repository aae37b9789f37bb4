use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::distr::Alphanumeric;
use rand::Rng;
use scrumboard_core::retrospective::bootstrap::planning_join_url;
use scrumboard_core::retrospective::ParticipantId;
use tokio::sync::{watch, RwLock};

use super::{Room, RoomError};
use crate::ws::WsSender;

const SESSION_PASSWORD_LEN: usize = 16;

/// All live retrospective rooms, keyed by session name.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    public_base_url: String,
}

impl RoomRegistry {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            public_base_url: public_base_url.into(),
        }
    }

    /// Create a fresh session.
    ///
    /// The join URL is published on the returned channel once the room is
    /// ready; callers await it without blocking. Like any session the
    /// substrate hands out, it points at the page that asked for it.
    pub async fn create_session(&self) -> watch::Receiver<Option<String>> {
        let name = uuid::Uuid::new_v4().simple().to_string();
        let password: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_PASSWORD_LEN)
            .map(char::from)
            .collect();

        self.rooms
            .write()
            .await
            .insert(name.clone(), Arc::new(Room::new(name.clone(), password.clone())));
        tracing::info!(session = %name, "Retrospective session created");

        let join_url = planning_join_url(&self.public_base_url, &name, &password);
        let (tx, rx) = watch::channel(None);
        tokio::spawn(async move {
            let _ = tx.send(Some(join_url));
        });
        rx
    }

    pub async fn get(&self, name: &str) -> Option<Arc<Room>> {
        self.rooms.read().await.get(name).cloned()
    }

    /// Look up a live session for joining.
    ///
    /// The returned claim keeps the room from being evicted until the
    /// participant joins or the claim is dropped.
    pub async fn open(&self, name: &str, password: &str) -> Result<PendingJoin, RoomError> {
        let rooms = self.rooms.read().await;
        let room = rooms.get(name).ok_or(RoomError::UnknownSession)?;
        if !room.check_password(password) {
            return Err(RoomError::WrongPassword);
        }
        Ok(PendingJoin::new(Arc::clone(room)))
    }

    /// Bring back a session whose room is gone (eviction, restart).
    ///
    /// Callers must have checked that `name` and `password` belong to a
    /// stored retrospective URL. A live room with a different password is
    /// rejected.
    pub async fn restore(&self, name: &str, password: &str) -> Result<PendingJoin, RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!(session = %name, "Restoring retrospective session");
                Arc::new(Room::new(name, password))
            });
        if !room.check_password(password) {
            return Err(RoomError::WrongPassword);
        }
        Ok(PendingJoin::new(Arc::clone(room)))
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Drop every room that has been empty for at least `max_idle`.
    /// Returns the evicted session names.
    pub async fn evict_idle(&self, max_idle: Duration) -> Vec<String> {
        let now = Instant::now();
        let mut rooms = self.rooms.write().await;

        let mut evicted = Vec::new();
        for (name, room) in rooms.iter() {
            if room.idle_for(now).await.is_some_and(|idle| idle >= max_idle) {
                evicted.push(name.clone());
            }
        }
        for name in &evicted {
            rooms.remove(name);
        }
        evicted
    }
}

/// A participant's claim on a room between [`RoomRegistry::open`] and
/// [`PendingJoin::join`]. The room does not count as idle while any claim
/// is held; dropping the claim releases it.
pub struct PendingJoin {
    room: Arc<Room>,
}

impl PendingJoin {
    fn new(room: Arc<Room>) -> Self {
        room.reserve_join();
        Self { room }
    }

    pub fn room(&self) -> &Arc<Room> {
        &self.room
    }

    /// Join the room and give up the claim.
    pub async fn join(
        self,
        participant_id: ParticipantId,
        nickname: String,
        sender: WsSender,
    ) -> Arc<Room> {
        self.room.join(participant_id, nickname, sender).await;
        Arc::clone(&self.room)
    }
}

impl std::fmt::Debug for PendingJoin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingJoin")
            .field("session", &self.room.name())
            .finish()
    }
}

impl Drop for PendingJoin {
    fn drop(&mut self) {
        self.room.release_join();
    }
}
