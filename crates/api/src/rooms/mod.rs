//! In-process realtime substrate for retrospective sessions.
//!
//! A [`Room`] is one session: the replicated board document plus other
//! shared values, the connected participants and their nicknames, and the
//! chat feed. [`RoomRegistry`] creates sessions, publishes their join URLs,
//! and evicts rooms nobody has used for a while.

mod registry;
mod room;

pub use registry::{PendingJoin, RoomRegistry};
pub use room::{Flow, Room};

use scrumboard_core::retrospective::ParticipantId;

/// Why a participant's message was rejected. Sent back as an `error`
/// message; the session stays open.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoomError {
    #[error("Participant {0} is not in this session")]
    UnknownParticipant(ParticipantId),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Nickname must not be blank")]
    BlankNickname,

    #[error("Chat message must not be blank")]
    EmptyMessage,

    #[error("Chat message is longer than {max} characters")]
    MessageTooLong { max: usize },

    #[error("Wrong session password")]
    WrongPassword,

    #[error("Unknown retrospective session")]
    UnknownSession,
}

impl RoomError {
    /// Machine-readable code for the `error` message.
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::UnknownParticipant(_) => "unknown_participant",
            RoomError::InvalidValue { .. } => "invalid_value",
            RoomError::BlankNickname => "invalid_nickname",
            RoomError::EmptyMessage | RoomError::MessageTooLong { .. } => "invalid_chat_message",
            RoomError::WrongPassword => "wrong_password",
            RoomError::UnknownSession => "unknown_session",
        }
    }
}
