//! WebSocket message protocol for retrospective sessions.
//!
//! Serialized as JSON with an internally-tagged `"type"` discriminator so
//! that the frontend can route messages by type string.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::board::Category;
use super::ops::BoardOp;
use super::ParticipantId;

/// Messages sent by a participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Publish a full replacement of the board (last write wins).
    #[serde(rename = "board.replace")]
    BoardReplace { categories: Vec<Category> },

    /// Apply one operation against the room's current board.
    #[serde(rename = "board.op")]
    BoardOp { op: BoardOp },

    /// Set any other shared value (e.g. `"scale"`).
    #[serde(rename = "shared.set")]
    SharedSet {
        key: String,
        value: serde_json::Value,
    },

    /// Change this participant's nickname.
    #[serde(rename = "nickname.set")]
    NicknameSet { nickname: String },

    /// Post to the session chat.
    #[serde(rename = "chat.send")]
    ChatSend { text: String },

    /// Leave the session without closing the socket first.
    #[serde(rename = "session.leave")]
    SessionLeave,
}

/// Messages sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// First message after joining: who you are and the full session state.
    #[serde(rename = "session.welcome")]
    Welcome {
        participant_id: ParticipantId,
        nickname: String,
        revision: u64,
        categories: Vec<Category>,
        values: HashMap<String, serde_json::Value>,
        participants: Vec<ParticipantInfo>,
        chat: Vec<ChatMessage>,
    },

    /// The board changed.
    #[serde(rename = "board.updated")]
    BoardUpdated {
        revision: u64,
        categories: Vec<Category>,
    },

    /// A non-board shared value changed.
    #[serde(rename = "shared.updated")]
    SharedUpdated {
        key: String,
        value: serde_json::Value,
    },

    /// Connected participants or their nicknames changed.
    #[serde(rename = "participants.update")]
    ParticipantsUpdate { participants: Vec<ParticipantInfo> },

    /// A new chat message.
    #[serde(rename = "chat.message")]
    Chat { message: ChatMessage },

    /// The last message from this participant was rejected.
    #[serde(rename = "error")]
    Error { code: String, message: String },
}

/// A connected participant as seen by one viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantInfo {
    pub id: ParticipantId,
    pub nickname: String,
    pub is_self: bool,
}

/// One entry of the session chat feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: ParticipantId,
    pub sender_nickname: String,
    pub text: String,
    pub sent_at: String,
}

impl ServerMessage {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrospective::board::default_categories;
    use crate::retrospective::reaction::ReactionIntent;

    #[test]
    fn test_board_op_message_parses() {
        let json = r#"{"type":"board.op","op":{"kind":"toggle_reaction","category_id":"1","note_id":"n","intent":"like"}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::BoardOp {
                op: BoardOp::ToggleReaction {
                    category_id: "1".into(),
                    note_id: "n".into(),
                    intent: ReactionIntent::Like,
                }
            }
        );
    }

    #[test]
    fn test_board_replace_accepts_original_document_shape() {
        let json = r#"{"type":"board.replace","categories":[{"id":"1","title":"Whats working?","color":"bg-yellow-200","notes":[{"id":"abc","text":"hi","likes":1,"dislikes":0,"comments":[],"likedBy":["u1"],"dislikedBy":[]}]}]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::BoardReplace { categories } => {
                assert_eq!(categories[0].notes[0].likes, 1);
                assert!(categories[0].notes[0]
                    .liked_by
                    .contains(&ParticipantId::from("u1")));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_unit_variant_parses() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"session.leave"}"#).unwrap();
        assert_eq!(msg, ClientMessage::SessionLeave);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"board.nuke"}"#).is_err());
    }

    #[test]
    fn test_server_messages_carry_type_tag() {
        let json = serde_json::to_string(&ServerMessage::BoardUpdated {
            revision: 3,
            categories: default_categories(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"board.updated""#));

        let json = serde_json::to_string(&ServerMessage::error("invalid_message", "bad")).unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""code":"invalid_message""#));
    }
}
