//! Per-operation board mutations.
//!
//! An operation names the intended change rather than the resulting
//! document. The session room applies operations one at a time against its
//! own copy of the board.

use serde::{Deserialize, Serialize};

use super::board::{self, Category};
use super::reaction::ReactionIntent;
use super::ParticipantId;

/// A single board mutation sent by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardOp {
    AddNote {
        category_id: String,
        text: String,
    },
    DeleteNote {
        category_id: String,
        note_id: String,
    },
    AddComment {
        category_id: String,
        note_id: String,
        text: String,
    },
    ToggleReaction {
        category_id: String,
        note_id: String,
        intent: ReactionIntent,
    },
    MoveNote {
        source_category_id: String,
        target_category_id: String,
        note_id: String,
    },
}

/// Who is applying an operation. Filled in by the room, never by the client.
#[derive(Debug, Clone)]
pub struct OpActor {
    pub participant_id: ParticipantId,
    pub nickname: String,
}

impl BoardOp {
    /// Short name used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            BoardOp::AddNote { .. } => "add_note",
            BoardOp::DeleteNote { .. } => "delete_note",
            BoardOp::AddComment { .. } => "add_comment",
            BoardOp::ToggleReaction { .. } => "toggle_reaction",
            BoardOp::MoveNote { .. } => "move_note",
        }
    }

    /// Compute the next document. Unknown ids and blank text are no-ops.
    pub fn apply(&self, categories: &[Category], actor: &OpActor) -> Vec<Category> {
        match self {
            BoardOp::AddNote { category_id, text } => board::add_note(categories, category_id, text),
            BoardOp::DeleteNote {
                category_id,
                note_id,
            } => board::delete_note(categories, category_id, note_id),
            BoardOp::AddComment {
                category_id,
                note_id,
                text,
            } => board::add_comment(categories, category_id, note_id, text, &actor.nickname),
            BoardOp::ToggleReaction {
                category_id,
                note_id,
                intent,
            } => board::toggle_reaction(
                categories,
                category_id,
                note_id,
                &actor.participant_id,
                *intent,
            ),
            BoardOp::MoveNote {
                source_category_id,
                target_category_id,
                note_id,
            } => board::move_note(categories, source_category_id, target_category_id, note_id),
        }
    }
}
