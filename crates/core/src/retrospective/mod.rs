//! Realtime retrospective board (shared document, reactions, sessions).
//!
//! The board is a single shared document (`Vec<Category>`) replicated to
//! every participant of a session. Every mutation is expressed as a pure
//! transform `next = f(current, args)` in [`board`]; [`reaction`] holds the
//! like/dislike state machine; [`ops`] carries the per-operation messages
//! applied by the session room; [`protocol`] is the WebSocket message
//! format; [`bootstrap`] decides how a sprint's retrospective is entered.

pub mod board;
pub mod bootstrap;
pub mod nickname;
pub mod ops;
pub mod protocol;
pub mod reaction;
pub mod view;

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared document keys
// ---------------------------------------------------------------------------

/// Shared-value key holding the category/note tree.
pub const CATEGORIES_KEY: &str = "categories";

/// Shared-value key holding the board zoom factor.
pub const SCALE_KEY: &str = "scale";

// ---------------------------------------------------------------------------
// Session limits
// ---------------------------------------------------------------------------

/// Number of chat messages replayed to a participant when they join.
pub const CHAT_HISTORY_LIMIT: usize = 200;

/// Longest accepted chat message, in characters.
pub const MAX_CHAT_MESSAGE_CHARS: usize = 2000;

/// Longest accepted nickname, in characters.
pub const MAX_NICKNAME_CHARS: usize = 64;

/// Default idle time (no participants) before a room is evicted: 6 hours.
pub const DEFAULT_ROOM_IDLE_SECS: u64 = 6 * 60 * 60;

/// How often the room reaper looks for idle rooms.
pub const ROOM_REAPER_INTERVAL_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// ParticipantId
// ---------------------------------------------------------------------------

/// Ephemeral, session-scoped identifier of one connected participant.
///
/// Assigned by the session room on join; stable for the lifetime of that
/// connection and unrelated to the account id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random participant id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Fresh identifier for notes and comments.
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
