use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use axum::extract::ws::Message;
use chrono::{SecondsFormat, Utc};
use scrumboard_core::retrospective::board::{self, default_categories, Category};
use scrumboard_core::retrospective::nickname::sanitize_nickname;
use scrumboard_core::retrospective::ops::{BoardOp, OpActor};
use scrumboard_core::retrospective::protocol::{
    ChatMessage, ClientMessage, ParticipantInfo, ServerMessage,
};
use scrumboard_core::retrospective::view::clamp_scale;
use scrumboard_core::retrospective::{
    fresh_id, ParticipantId, CATEGORIES_KEY, CHAT_HISTORY_LIMIT, MAX_CHAT_MESSAGE_CHARS,
    SCALE_KEY,
};
use tokio::sync::RwLock;

use super::RoomError;
use crate::ws::WsSender;

/// What the socket loop should do after a message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Leave,
}

struct Participant {
    nickname: String,
    sender: WsSender,
}

struct RoomState {
    /// Bumped on every accepted board write.
    revision: u64,
    categories: Vec<Category>,
    /// Every shared key except the board.
    values: HashMap<String, serde_json::Value>,
    participants: BTreeMap<ParticipantId, Participant>,
    chat: VecDeque<ChatMessage>,
    /// When the room last became empty. `None` while anyone is connected.
    idle_since: Option<Instant>,
}

/// One retrospective session.
///
/// All writes take the state lock, so board operations from different
/// participants are applied one after another against the current document
/// and fanned out in revision order.
pub struct Room {
    name: String,
    password: String,
    /// Participants between `RoomRegistry::open` and `join`.
    pending_joins: AtomicUsize,
    state: RwLock<RoomState>,
}

impl Room {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            pending_joins: AtomicUsize::new(0),
            state: RwLock::new(RoomState {
                revision: 0,
                categories: default_categories(),
                values: HashMap::new(),
                participants: BTreeMap::new(),
                chat: VecDeque::new(),
                idle_since: Some(Instant::now()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check_password(&self, password: &str) -> bool {
        self.password == password
    }

    pub(super) fn reserve_join(&self) {
        self.pending_joins.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn release_join(&self) {
        self.pending_joins.fetch_sub(1, Ordering::SeqCst);
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Add a participant, send them `session.welcome` and tell everyone else.
    pub async fn join(
        &self,
        participant_id: ParticipantId,
        nickname: String,
        sender: WsSender,
    ) {
        let mut state = self.state.write().await;
        state.participants.insert(
            participant_id.clone(),
            Participant {
                nickname: nickname.clone(),
                sender,
            },
        );
        state.idle_since = None;

        let welcome = ServerMessage::Welcome {
            participant_id: participant_id.clone(),
            nickname,
            revision: state.revision,
            categories: state.categories.clone(),
            values: state.values.clone(),
            participants: state.participants_for(&participant_id),
            chat: state.chat.iter().cloned().collect(),
        };
        state.send_to(&participant_id, &welcome);
        state.broadcast_participants(Some(&participant_id));

        tracing::info!(
            session = %self.name,
            participant_id = %participant_id,
            participants = state.participants.len(),
            "Participant joined"
        );
    }

    /// Remove a participant. Returns `false` if they were not connected.
    pub async fn leave(&self, participant_id: &ParticipantId) -> bool {
        let mut state = self.state.write().await;
        if state.participants.remove(participant_id).is_none() {
            return false;
        }
        if state.participants.is_empty() {
            state.idle_since = Some(Instant::now());
        }
        state.broadcast_participants(None);

        tracing::info!(
            session = %self.name,
            participant_id = %participant_id,
            participants = state.participants.len(),
            "Participant left"
        );
        true
    }

    pub async fn participant_count(&self) -> usize {
        self.state.read().await.participants.len()
    }

    /// The connected participants as `viewer` sees them.
    pub async fn participants_for(&self, viewer: &ParticipantId) -> Vec<ParticipantInfo> {
        self.state.read().await.participants_for(viewer)
    }

    pub async fn nicknames(&self) -> BTreeMap<ParticipantId, String> {
        self.state
            .read()
            .await
            .participants
            .iter()
            .map(|(id, p)| (id.clone(), p.nickname.clone()))
            .collect()
    }

    /// Change a participant's nickname and refresh everyone's roster.
    pub async fn set_nickname(
        &self,
        participant_id: &ParticipantId,
        raw: &str,
    ) -> Result<String, RoomError> {
        let nickname = sanitize_nickname(raw).ok_or(RoomError::BlankNickname)?;
        let mut state = self.state.write().await;
        let participant = state
            .participants
            .get_mut(participant_id)
            .ok_or_else(|| RoomError::UnknownParticipant(participant_id.clone()))?;
        participant.nickname = nickname.clone();
        state.broadcast_participants(None);
        Ok(nickname)
    }

    /// How long the room has been empty, or `None` if someone is connected
    /// or about to join.
    pub async fn idle_for(&self, now: Instant) -> Option<Duration> {
        if self.pending_joins.load(Ordering::SeqCst) > 0 {
            return None;
        }
        let state = self.state.read().await;
        if !state.participants.is_empty() {
            return None;
        }
        state
            .idle_since
            .map(|since| now.saturating_duration_since(since))
    }

    // -----------------------------------------------------------------------
    // Board document
    // -----------------------------------------------------------------------

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories.clone()
    }

    pub async fn revision(&self) -> u64 {
        self.state.read().await.revision
    }

    /// Whole-document publish. Last write wins; the document is repaired
    /// with [`board::normalize`] before it is stored.
    pub async fn replace_categories(&self, categories: Vec<Category>) -> u64 {
        let mut state = self.state.write().await;
        state.commit_board(board::normalize(categories))
    }

    /// Apply one operation on behalf of `participant_id`.
    ///
    /// Returns the revision after the operation. Operations that change
    /// nothing (unknown ids, blank text) are not broadcast.
    pub async fn apply_op(
        &self,
        participant_id: &ParticipantId,
        op: &BoardOp,
    ) -> Result<u64, RoomError> {
        let mut state = self.state.write().await;
        let actor = OpActor {
            participant_id: participant_id.clone(),
            nickname: state
                .participants
                .get(participant_id)
                .map(|p| p.nickname.clone())
                .ok_or_else(|| RoomError::UnknownParticipant(participant_id.clone()))?,
        };

        let next = op.apply(&state.categories, &actor);
        if next == state.categories {
            tracing::debug!(session = %self.name, op = op.kind(), "Board op changed nothing");
            return Ok(state.revision);
        }

        let revision = state.commit_board(next);
        tracing::debug!(session = %self.name, op = op.kind(), revision, "Board op applied");
        Ok(revision)
    }

    // -----------------------------------------------------------------------
    // Other shared values
    // -----------------------------------------------------------------------

    /// Current value under `key`, seeding it with `initial` on first read.
    pub async fn shared_value(&self, key: &str, initial: serde_json::Value) -> serde_json::Value {
        let mut state = self.state.write().await;
        if key == CATEGORIES_KEY {
            return serde_json::to_value(&state.categories).unwrap_or(initial);
        }
        state
            .values
            .entry(key.to_string())
            .or_insert(initial)
            .clone()
    }

    /// Publish a new value for `key` to every participant.
    ///
    /// `"categories"` is routed through [`Room::replace_categories`] and
    /// `"scale"` is clamped into the zoom range.
    pub async fn set_shared_value(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), RoomError> {
        let invalid = |reason: String| RoomError::InvalidValue {
            key: key.to_string(),
            reason,
        };

        if key.trim().is_empty() {
            return Err(invalid("key must not be blank".into()));
        }

        if key == CATEGORIES_KEY {
            let categories: Vec<Category> =
                serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
            self.replace_categories(categories).await;
            return Ok(());
        }

        let value = if key == SCALE_KEY {
            let scale = value
                .as_f64()
                .ok_or_else(|| invalid("expected a number".into()))?;
            serde_json::json!(clamp_scale(scale))
        } else {
            value
        };

        let mut state = self.state.write().await;
        state.values.insert(key.to_string(), value.clone());
        state.broadcast(&ServerMessage::SharedUpdated {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    pub async fn post_chat(
        &self,
        participant_id: &ParticipantId,
        text: &str,
    ) -> Result<ChatMessage, RoomError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RoomError::EmptyMessage);
        }
        if text.chars().count() > MAX_CHAT_MESSAGE_CHARS {
            return Err(RoomError::MessageTooLong {
                max: MAX_CHAT_MESSAGE_CHARS,
            });
        }

        let mut state = self.state.write().await;
        let sender_nickname = state
            .participants
            .get(participant_id)
            .map(|p| p.nickname.clone())
            .ok_or_else(|| RoomError::UnknownParticipant(participant_id.clone()))?;

        let message = ChatMessage {
            id: fresh_id(),
            sender_id: participant_id.clone(),
            sender_nickname,
            text: text.to_string(),
            sent_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        state.chat.push_back(message.clone());
        while state.chat.len() > CHAT_HISTORY_LIMIT {
            state.chat.pop_front();
        }
        state.broadcast(&ServerMessage::Chat {
            message: message.clone(),
        });
        Ok(message)
    }

    pub async fn chat_history(&self) -> Vec<ChatMessage> {
        self.state.read().await.chat.iter().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Handle one decoded client message from `from`.
    pub async fn handle(
        &self,
        from: &ParticipantId,
        message: ClientMessage,
    ) -> Result<Flow, RoomError> {
        match message {
            ClientMessage::BoardReplace { categories } => {
                self.replace_categories(categories).await;
            }
            ClientMessage::BoardOp { op } => {
                self.apply_op(from, &op).await?;
            }
            ClientMessage::SharedSet { key, value } => {
                self.set_shared_value(&key, value).await?;
            }
            ClientMessage::NicknameSet { nickname } => {
                self.set_nickname(from, &nickname).await?;
            }
            ClientMessage::ChatSend { text } => {
                self.post_chat(from, &text).await?;
            }
            ClientMessage::SessionLeave => return Ok(Flow::Leave),
        }
        Ok(Flow::Continue)
    }

    /// Send a message to one participant only.
    pub async fn send_to(&self, participant_id: &ParticipantId, message: &ServerMessage) {
        self.state.read().await.send_to(participant_id, message);
    }
}

impl RoomState {
    fn commit_board(&mut self, categories: Vec<Category>) -> u64 {
        self.categories = categories;
        self.revision += 1;
        self.broadcast(&ServerMessage::BoardUpdated {
            revision: self.revision,
            categories: self.categories.clone(),
        });
        self.revision
    }

    fn participants_for(&self, viewer: &ParticipantId) -> Vec<ParticipantInfo> {
        self.participants
            .iter()
            .map(|(id, p)| ParticipantInfo {
                id: id.clone(),
                nickname: p.nickname.clone(),
                is_self: id == viewer,
            })
            .collect()
    }

    fn send_to(&self, participant_id: &ParticipantId, message: &ServerMessage) {
        if let (Some(participant), Some(frame)) =
            (self.participants.get(participant_id), encode(message))
        {
            let _ = participant.sender.send(frame);
        }
    }

    fn broadcast(&self, message: &ServerMessage) {
        let Some(frame) = encode(message) else {
            return;
        };
        for participant in self.participants.values() {
            let _ = participant.sender.send(frame.clone());
        }
    }

    /// Roster differs per viewer (`is_self`), so each gets their own copy.
    fn broadcast_participants(&self, skip: Option<&ParticipantId>) {
        for id in self.participants.keys() {
            if Some(id) == skip {
                continue;
            }
            self.send_to(
                id,
                &ServerMessage::ParticipantsUpdate {
                    participants: self.participants_for(id),
                },
            );
        }
    }
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode server message");
            None
        }
    }
}
