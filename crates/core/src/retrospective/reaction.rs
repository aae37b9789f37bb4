//! Like/dislike state machine for one `(note, participant)` pair.
//!
//! | current  | intent  | next     |
//! |----------|---------|----------|
//! | Neutral  | Like    | Liked    |
//! | Neutral  | Dislike | Disliked |
//! | Liked    | Like    | Neutral  |
//! | Liked    | Dislike | Disliked |
//! | Disliked | Dislike | Neutral  |
//! | Disliked | Like    | Liked    |
//!
//! Counters are never adjusted directly: membership changes first and the
//! counters are recomputed from the set sizes.

use serde::{Deserialize, Serialize};

use super::board::Note;
use super::ParticipantId;

/// What the participant clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionIntent {
    Like,
    Dislike,
}

/// A participant's current reaction to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionState {
    Neutral,
    Liked,
    Disliked,
}

impl ReactionState {
    /// Read `participant`'s state from the note's membership sets.
    pub fn of(note: &Note, participant: &ParticipantId) -> Self {
        if note.liked_by.contains(participant) {
            ReactionState::Liked
        } else if note.disliked_by.contains(participant) {
            ReactionState::Disliked
        } else {
            ReactionState::Neutral
        }
    }

    /// Transition for `intent`. Total over all state/intent pairs.
    pub fn next(self, intent: ReactionIntent) -> Self {
        match (self, intent) {
            (ReactionState::Neutral, ReactionIntent::Like) => ReactionState::Liked,
            (ReactionState::Neutral, ReactionIntent::Dislike) => ReactionState::Disliked,
            (ReactionState::Liked, ReactionIntent::Like) => ReactionState::Neutral,
            (ReactionState::Liked, ReactionIntent::Dislike) => ReactionState::Disliked,
            (ReactionState::Disliked, ReactionIntent::Dislike) => ReactionState::Neutral,
            (ReactionState::Disliked, ReactionIntent::Like) => ReactionState::Liked,
        }
    }
}

/// Apply `intent` from `participant` and return the updated note.
///
/// Clicking the same reaction twice toggles it off again. That is the
/// intended button behaviour, so the function is an involution per intent
/// rather than idempotent. Other participants' memberships are untouched.
pub fn toggle_reaction(note: &Note, participant: &ParticipantId, intent: ReactionIntent) -> Note {
    let next_state = ReactionState::of(note, participant).next(intent);

    let mut next = note.clone();
    next.liked_by.remove(participant);
    next.disliked_by.remove(participant);
    match next_state {
        ReactionState::Liked => {
            next.liked_by.insert(participant.clone());
        }
        ReactionState::Disliked => {
            next.disliked_by.insert(participant.clone());
        }
        ReactionState::Neutral => {}
    }
    next.sync_counters();
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [ReactionState; 3] = [
        ReactionState::Neutral,
        ReactionState::Liked,
        ReactionState::Disliked,
    ];
    const ALL_INTENTS: [ReactionIntent; 2] = [ReactionIntent::Like, ReactionIntent::Dislike];

    fn p(id: &str) -> ParticipantId {
        ParticipantId::from(id)
    }

    fn assert_consistent(note: &Note) {
        assert_eq!(note.likes as usize, note.liked_by.len());
        assert_eq!(note.dislikes as usize, note.disliked_by.len());
        assert!(note.liked_by.is_disjoint(&note.disliked_by));
    }

    /// Build a note where `participant` is in `state`.
    fn note_in(state: ReactionState, participant: &ParticipantId) -> Note {
        let note = Note::new("n");
        match state {
            ReactionState::Neutral => note,
            ReactionState::Liked => toggle_reaction(&note, participant, ReactionIntent::Like),
            ReactionState::Disliked => toggle_reaction(&note, participant, ReactionIntent::Dislike),
        }
    }

    #[test]
    fn test_transition_table() {
        use ReactionIntent::*;
        use ReactionState::*;
        assert_eq!(Neutral.next(Like), Liked);
        assert_eq!(Neutral.next(Dislike), Disliked);
        assert_eq!(Liked.next(Like), Neutral);
        assert_eq!(Liked.next(Dislike), Disliked);
        assert_eq!(Disliked.next(Dislike), Neutral);
        assert_eq!(Disliked.next(Like), Liked);
    }

    #[test]
    fn test_every_transition_matches_membership() {
        let u = p("u1");
        for state in ALL_STATES {
            for intent in ALL_INTENTS {
                let before = note_in(state, &u);
                let after = toggle_reaction(&before, &u, intent);
                assert_eq!(ReactionState::of(&after, &u), state.next(intent));
                assert_consistent(&after);
            }
        }
    }

    #[test]
    fn test_counter_deltas() {
        let u = p("u1");
        let liked = note_in(ReactionState::Liked, &u);
        let switched = toggle_reaction(&liked, &u, ReactionIntent::Dislike);
        assert_eq!(switched.likes, liked.likes - 1);
        assert_eq!(switched.dislikes, liked.dislikes + 1);

        let disliked = note_in(ReactionState::Disliked, &u);
        let switched = toggle_reaction(&disliked, &u, ReactionIntent::Like);
        assert_eq!(switched.likes, disliked.likes + 1);
        assert_eq!(switched.dislikes, disliked.dislikes - 1);
    }

    #[test]
    fn test_same_intent_twice_returns_to_original() {
        let u = p("u1");
        let note = Note::new("n");
        for intent in ALL_INTENTS {
            let twice = toggle_reaction(&toggle_reaction(&note, &u, intent), &u, intent);
            assert_eq!(twice, note);
        }
    }

    #[test]
    fn test_switch_leaves_other_participants_untouched() {
        let (u1, u2, u3) = (p("u1"), p("u2"), p("u3"));
        let note = Note::new("n");
        let note = toggle_reaction(&note, &u2, ReactionIntent::Like);
        let note = toggle_reaction(&note, &u3, ReactionIntent::Dislike);
        let note = toggle_reaction(&note, &u1, ReactionIntent::Like);

        let next = toggle_reaction(&note, &u1, ReactionIntent::Dislike);
        assert_eq!(ReactionState::of(&next, &u2), ReactionState::Liked);
        assert_eq!(ReactionState::of(&next, &u3), ReactionState::Disliked);
        assert_eq!(ReactionState::of(&next, &u1), ReactionState::Disliked);
        assert_eq!((next.likes, next.dislikes), (1, 2));
    }

    #[test]
    fn test_counters_stay_consistent_over_long_sequences() {
        let people = [p("a"), p("b"), p("c"), p("d")];
        let mut note = Note::new("n");
        // Deterministic pseudo-random walk over participants and intents.
        let mut seed: u32 = 7;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let who = &people[(seed >> 8) as usize % people.len()];
            let intent = ALL_INTENTS[(seed >> 16) as usize % 2];
            note = toggle_reaction(&note, who, intent);
            assert_consistent(&note);
        }
    }
}
