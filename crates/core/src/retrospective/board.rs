//! Board document schema and whole-tree transforms.
//!
//! Every function here takes the current document and returns the next one.
//! None of them fail: blank text and references to unknown categories or
//! notes (usually a harmless race with a concurrent delete) return an
//! unchanged copy of the input.

use std::collections::BTreeSet;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::reaction::{self, ReactionIntent};
use super::{fresh_id, ParticipantId};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A fixed board column. Only `notes` changes at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub color: String,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// One retrospective contribution.
///
/// `likes` and `dislikes` always equal the sizes of `liked_by` and
/// `disliked_by`, and the two sets never share a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub liked_by: BTreeSet<ParticipantId>,
    #[serde(default)]
    pub disliked_by: BTreeSet<ParticipantId>,
}

/// Immutable comment attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    /// Author's wall clock, ISO-8601. Only approximately ordered across clients.
    pub timestamp: String,
}

impl Note {
    /// A fresh note with no reactions or comments.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            text: text.into(),
            likes: 0,
            dislikes: 0,
            comments: Vec::new(),
            liked_by: BTreeSet::new(),
            disliked_by: BTreeSet::new(),
        }
    }

    /// Recompute the counters from set membership.
    pub(crate) fn sync_counters(&mut self) {
        self.likes = self.liked_by.len() as u32;
        self.dislikes = self.disliked_by.len() as u32;
    }
}

impl Comment {
    /// A comment stamped with a fresh id and the current UTC time.
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            text: text.into(),
            author: author.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// The four columns every new board starts with, in display order.
pub fn default_categories() -> Vec<Category> {
    [
        ("1", "Whats working?", "bg-yellow-200"),
        ("2", "What improvements should we do?", "bg-green-400"),
        ("3", "Whats not working?", "bg-red-200"),
        ("4", "Helpfull last sprint improvements?", "bg-blue-300"),
    ]
    .into_iter()
    .map(|(id, title, color)| Category {
        id: id.to_string(),
        title: title.to_string(),
        color: color.to_string(),
        notes: Vec::new(),
    })
    .collect()
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Append a new note to `category_id`.
pub fn add_note(categories: &[Category], category_id: &str, text: &str) -> Vec<Category> {
    if is_blank(text) {
        return categories.to_vec();
    }
    insert_note(categories, category_id, Note::new(text))
}

/// Append an already-built note to `category_id`.
pub fn insert_note(categories: &[Category], category_id: &str, note: Note) -> Vec<Category> {
    let mut next = categories.to_vec();
    if let Some(category) = next.iter_mut().find(|c| c.id == category_id) {
        category.notes.push(note);
    }
    next
}

/// Remove `note_id` from `category_id`.
///
/// If the removed note is open in a comment modal, the view must clear it
/// (see [`BoardView::on_note_deleted`](super::view::BoardView::on_note_deleted)).
pub fn delete_note(categories: &[Category], category_id: &str, note_id: &str) -> Vec<Category> {
    let mut next = categories.to_vec();
    if let Some(category) = next.iter_mut().find(|c| c.id == category_id) {
        if let Some(pos) = category.notes.iter().position(|n| n.id == note_id) {
            category.notes.remove(pos);
        }
    }
    next
}

/// Append a comment to a note. Comments are never edited or removed.
pub fn add_comment(
    categories: &[Category],
    category_id: &str,
    note_id: &str,
    text: &str,
    author: &str,
) -> Vec<Category> {
    if is_blank(text) {
        return categories.to_vec();
    }
    let mut next = categories.to_vec();
    if let Some(note) = find_note_mut(&mut next, category_id, note_id) {
        note.comments.push(Comment::new(text, author));
    }
    next
}

/// Move a note, with all its reactions and comments, to the end of another
/// category.
pub fn move_note(
    categories: &[Category],
    source_id: &str,
    target_id: &str,
    note_id: &str,
) -> Vec<Category> {
    if source_id == target_id || !categories.iter().any(|c| c.id == target_id) {
        return categories.to_vec();
    }
    let Some(note) = find_note(categories, source_id, note_id).cloned() else {
        return categories.to_vec();
    };

    categories
        .iter()
        .map(|category| {
            if category.id == source_id {
                Category {
                    notes: category
                        .notes
                        .iter()
                        .filter(|n| n.id != note_id)
                        .cloned()
                        .collect(),
                    ..category.clone()
                }
            } else if category.id == target_id {
                let mut moved = category.clone();
                moved.notes.push(note.clone());
                moved
            } else {
                category.clone()
            }
        })
        .collect()
}

/// Apply a like/dislike toggle from `participant` to one note.
pub fn toggle_reaction(
    categories: &[Category],
    category_id: &str,
    note_id: &str,
    participant: &ParticipantId,
    intent: ReactionIntent,
) -> Vec<Category> {
    let mut next = categories.to_vec();
    if let Some(note) = find_note_mut(&mut next, category_id, note_id) {
        *note = reaction::toggle_reaction(note, participant, intent);
    }
    next
}

/// Repair a document received through a whole-document write.
///
/// Counters are recomputed from set sizes, and a participant present in both
/// `likedBy` and `dislikedBy` is removed from both (back to Neutral).
pub fn normalize(categories: Vec<Category>) -> Vec<Category> {
    categories
        .into_iter()
        .map(|mut category| {
            for note in &mut category.notes {
                let conflicted: Vec<ParticipantId> = note
                    .liked_by
                    .intersection(&note.disliked_by)
                    .cloned()
                    .collect();
                for participant in &conflicted {
                    note.liked_by.remove(participant);
                    note.disliked_by.remove(participant);
                }
                note.sync_counters();
            }
            category
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Find a note by category and note id.
pub fn find_note<'a>(categories: &'a [Category], category_id: &str, note_id: &str) -> Option<&'a Note> {
    categories
        .iter()
        .find(|c| c.id == category_id)
        .and_then(|c| c.notes.iter().find(|n| n.id == note_id))
}

fn find_note_mut<'a>(
    categories: &'a mut [Category],
    category_id: &str,
    note_id: &str,
) -> Option<&'a mut Note> {
    categories
        .iter_mut()
        .find(|c| c.id == category_id)
        .and_then(|c| c.notes.iter_mut().find(|n| n.id == note_id))
}

/// Total number of notes on the board.
pub fn note_count(categories: &[Category]) -> usize {
    categories.iter().map(|c| c.notes.len()).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_note(text: &str) -> (Vec<Category>, String) {
        let board = add_note(&default_categories(), "1", text);
        let id = board[0].notes[0].id.clone();
        (board, id)
    }

    // -----------------------------------------------------------------------
    // Seed document
    // -----------------------------------------------------------------------

    #[test]
    fn test_default_categories_are_ordered_and_empty() {
        let cats = default_categories();
        let ids: Vec<&str> = cats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);
        assert_eq!(cats[0].title, "Whats working?");
        assert!(cats.iter().all(|c| c.notes.is_empty()));
    }

    // -----------------------------------------------------------------------
    // add_note
    // -----------------------------------------------------------------------

    #[test]
    fn test_add_note_appends_fresh_note() {
        let (board, _) = board_with_note("Great teamwork");
        let note = &board[0].notes[0];
        assert_eq!(note.text, "Great teamwork");
        assert_eq!((note.likes, note.dislikes), (0, 0));
        assert!(note.liked_by.is_empty());
        assert!(note.disliked_by.is_empty());
        assert!(note.comments.is_empty());
        assert!(board[1..].iter().all(|c| c.notes.is_empty()));
    }

    #[test]
    fn test_add_note_preserves_insertion_order() {
        let board = add_note(&default_categories(), "2", "first");
        let board = add_note(&board, "2", "second");
        let texts: Vec<&str> = board[1].notes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn test_add_note_ids_are_unique() {
        let board = add_note(&default_categories(), "1", "a");
        let board = add_note(&board, "1", "b");
        assert_ne!(board[0].notes[0].id, board[0].notes[1].id);
    }

    #[test]
    fn test_add_note_blank_text_is_noop() {
        let cats = default_categories();
        assert_eq!(add_note(&cats, "1", ""), cats);
        assert_eq!(add_note(&cats, "1", "   "), cats);
        assert_eq!(add_note(&cats, "1", "\n\t"), cats);
    }

    #[test]
    fn test_add_note_unknown_category_is_noop() {
        let cats = default_categories();
        assert_eq!(add_note(&cats, "99", "hello"), cats);
    }

    // -----------------------------------------------------------------------
    // delete_note
    // -----------------------------------------------------------------------

    #[test]
    fn test_delete_note_removes_exactly_one() {
        let board = add_note(&default_categories(), "1", "keep");
        let board = add_note(&board, "1", "drop");
        let board = add_note(&board, "3", "other");
        let drop_id = board[0].notes[1].id.clone();

        let next = delete_note(&board, "1", &drop_id);
        assert_eq!(note_count(&next), 2);
        assert_eq!(next[0].notes.len(), 1);
        assert_eq!(next[0].notes[0].text, "keep");
        assert_eq!(next[2], board[2]);
    }

    #[test]
    fn test_delete_missing_note_is_noop() {
        let (board, id) = board_with_note("x");
        assert_eq!(delete_note(&board, "1", "nope"), board);
        // Right note id, wrong category.
        assert_eq!(delete_note(&board, "2", &id), board);
        assert_eq!(delete_note(&board, "42", &id), board);
    }

    // -----------------------------------------------------------------------
    // add_comment
    // -----------------------------------------------------------------------

    #[test]
    fn test_add_comment_appends_with_author_and_timestamp() {
        let (board, id) = board_with_note("Great teamwork");
        let board = add_comment(&board, "1", &id, "Agreed!", "Alice");
        let board = add_comment(&board, "1", &id, "Same", "Bob");

        let comments = &find_note(&board, "1", &id).unwrap().comments;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "Agreed!");
        assert_eq!(comments[0].author, "Alice");
        assert_eq!(comments[1].author, "Bob");
        assert!(chrono::DateTime::parse_from_rfc3339(&comments[0].timestamp).is_ok());
        assert_ne!(comments[0].id, comments[1].id);
    }

    #[test]
    fn test_add_comment_blank_or_missing_is_noop() {
        let (board, id) = board_with_note("x");
        assert_eq!(add_comment(&board, "1", &id, "  ", "Alice"), board);
        assert_eq!(add_comment(&board, "1", "missing", "hi", "Alice"), board);
        assert_eq!(add_comment(&board, "2", &id, "hi", "Alice"), board);
    }

    // -----------------------------------------------------------------------
    // move_note
    // -----------------------------------------------------------------------

    #[test]
    fn test_move_note_preserves_full_state() {
        let (board, id) = board_with_note("movable");
        let board = add_comment(&board, "1", &id, "c1", "Alice");
        let board = toggle_reaction(&board, "1", &id, &"u1".into(), ReactionIntent::Like);
        let board = toggle_reaction(&board, "1", &id, &"u2".into(), ReactionIntent::Dislike);
        let before = find_note(&board, "1", &id).unwrap().clone();

        let next = move_note(&board, "1", "3", &id);
        assert!(find_note(&next, "1", &id).is_none());
        assert_eq!(find_note(&next, "3", &id), Some(&before));
        assert_eq!(note_count(&next), 1);
    }

    #[test]
    fn test_move_note_appends_at_end_of_target() {
        let board = add_note(&default_categories(), "2", "existing");
        let board = add_note(&board, "1", "incoming");
        let id = board[0].notes[0].id.clone();

        let next = move_note(&board, "1", "2", &id);
        assert_eq!(next[1].notes.last().unwrap().id, id);
        assert_eq!(next[1].notes[0].text, "existing");
    }

    #[test]
    fn test_move_note_noops() {
        let (board, id) = board_with_note("x");
        assert_eq!(move_note(&board, "1", "1", &id), board);
        assert_eq!(move_note(&board, "1", "9", &id), board);
        assert_eq!(move_note(&board, "9", "2", &id), board);
        assert_eq!(move_note(&board, "1", "2", "missing"), board);
    }

    // -----------------------------------------------------------------------
    // normalize
    // -----------------------------------------------------------------------

    #[test]
    fn test_normalize_recomputes_counters_and_resolves_conflicts() {
        let (mut board, _) = board_with_note("x");
        let note = &mut board[0].notes[0];
        note.likes = 10;
        note.dislikes = 3;
        note.liked_by.insert("u1".into());
        note.liked_by.insert("u2".into());
        note.disliked_by.insert("u2".into());

        let board = normalize(board);
        let note = &board[0].notes[0];
        assert_eq!(note.likes, 1);
        assert_eq!(note.dislikes, 0);
        assert!(note.liked_by.contains(&ParticipantId::from("u1")));
        assert!(!note.liked_by.contains(&ParticipantId::from("u2")));
        assert!(note.disliked_by.is_empty());
    }

    // -----------------------------------------------------------------------
    // Wire shape
    // -----------------------------------------------------------------------

    #[test]
    fn test_note_serializes_camel_case_sets_as_arrays() {
        let (board, id) = board_with_note("x");
        let board = toggle_reaction(&board, "1", &id, &"u1".into(), ReactionIntent::Like);
        let json = serde_json::to_value(&board[0].notes[0]).unwrap();
        assert_eq!(json["likedBy"], serde_json::json!(["u1"]));
        assert_eq!(json["dislikedBy"], serde_json::json!([]));
        assert_eq!(json["likes"], 1);
    }

    #[test]
    fn test_note_deserializes_with_missing_optional_fields() {
        let note: Note = serde_json::from_str(r#"{"id":"n1","text":"hi"}"#).unwrap();
        assert_eq!(note.likes, 0);
        assert!(note.liked_by.is_empty());
        assert!(note.comments.is_empty());
    }

    // -----------------------------------------------------------------------
    // End-to-end scenario
    // -----------------------------------------------------------------------

    #[test]
    fn test_scenario_add_react_comment() {
        let u1 = ParticipantId::from("u1");
        let u2 = ParticipantId::from("u2");

        let board = add_note(&default_categories(), "1", "Great teamwork");
        let id = board[0].notes[0].id.clone();

        let board = toggle_reaction(&board, "1", &id, &u1, ReactionIntent::Like);
        let note = find_note(&board, "1", &id).unwrap();
        assert_eq!(note.likes, 1);
        assert_eq!(note.liked_by, BTreeSet::from([u1.clone()]));

        let board = toggle_reaction(&board, "1", &id, &u1, ReactionIntent::Dislike);
        let note = find_note(&board, "1", &id).unwrap();
        assert_eq!((note.likes, note.dislikes), (0, 1));
        assert!(note.liked_by.is_empty());
        assert_eq!(note.disliked_by, BTreeSet::from([u1.clone()]));

        let board = toggle_reaction(&board, "1", &id, &u2, ReactionIntent::Like);
        let note = find_note(&board, "1", &id).unwrap();
        assert_eq!((note.likes, note.dislikes), (1, 1));
        assert_eq!(note.liked_by, BTreeSet::from([u2]));
        assert_eq!(note.disliked_by, BTreeSet::from([u1]));

        let board = add_comment(&board, "1", &id, "Agreed!", "Alice");
        let comments = &find_note(&board, "1", &id).unwrap().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "Agreed!");
        assert_eq!(comments[0].author, "Alice");
    }
}
