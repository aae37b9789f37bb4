//! Per-participant board view state.
//!
//! None of this is shared: it is what one participant has open. It lives
//! here because several of its transitions follow from board mutations.

/// Smallest allowed board zoom factor.
pub const MIN_SCALE: f64 = 0.5;

/// Largest allowed board zoom factor.
pub const MAX_SCALE: f64 = 2.0;

/// Zoom step per click.
pub const SCALE_STEP: f64 = 0.1;

/// Zoom factor of a fresh board.
pub const DEFAULT_SCALE: f64 = 1.0;

/// The note whose comment modal is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNote {
    pub category_id: String,
    pub note_id: String,
}

/// Local UI state of one participant's board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardView {
    /// Category whose "add a note" composer is open.
    pub composer_category: Option<String>,
    pub active_note: Option<ActiveNote>,
    pub chat_open: bool,
}

impl BoardView {
    pub fn open_composer(&mut self, category_id: &str) {
        self.composer_category = Some(category_id.to_string());
    }

    /// Called after a note was submitted or the composer was cancelled.
    pub fn close_composer(&mut self) {
        self.composer_category = None;
    }

    pub fn open_comments(&mut self, category_id: &str, note_id: &str) {
        self.active_note = Some(ActiveNote {
            category_id: category_id.to_string(),
            note_id: note_id.to_string(),
        });
    }

    pub fn close_comments(&mut self) {
        self.active_note = None;
    }

    /// A note was deleted; drop the modal if it was showing that note.
    pub fn on_note_deleted(&mut self, note_id: &str) {
        if self
            .active_note
            .as_ref()
            .is_some_and(|active| active.note_id == note_id)
        {
            self.active_note = None;
        }
    }

    /// A note was moved; keep the modal pointing at its new category.
    pub fn on_note_moved(&mut self, note_id: &str, target_category_id: &str) {
        if let Some(active) = self.active_note.as_mut() {
            if active.note_id == note_id {
                active.category_id = target_category_id.to_string();
            }
        }
    }

    pub fn toggle_chat(&mut self) {
        self.chat_open = !self.chat_open;
    }
}

/// Clamp a zoom factor into range, rounded to one decimal.
pub fn clamp_scale(scale: f64) -> f64 {
    // Round to one decimal so repeated steps do not drift (0.1 + 0.2 ...).
    ((scale * 10.0).round() / 10.0).clamp(MIN_SCALE, MAX_SCALE)
}

/// Next zoom factor after zooming in.
pub fn zoom_in(scale: f64) -> f64 {
    clamp_scale(scale + SCALE_STEP)
}

/// Next zoom factor after zooming out.
pub fn zoom_out(scale: f64) -> f64 {
    clamp_scale(scale - SCALE_STEP)
}

pub fn reset_zoom() -> f64 {
    DEFAULT_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleting_active_note_clears_modal() {
        let mut view = BoardView::default();
        view.open_comments("1", "n1");
        view.on_note_deleted("n2");
        assert!(view.active_note.is_some());
        view.on_note_deleted("n1");
        assert!(view.active_note.is_none());
    }

    #[test]
    fn test_moving_active_note_follows_it() {
        let mut view = BoardView::default();
        view.open_comments("1", "n1");
        view.on_note_moved("n1", "3");
        assert_eq!(
            view.active_note,
            Some(ActiveNote {
                category_id: "3".into(),
                note_id: "n1".into()
            })
        );
    }

    #[test]
    fn test_composer_and_chat_toggles() {
        let mut view = BoardView::default();
        view.open_composer("2");
        assert_eq!(view.composer_category.as_deref(), Some("2"));
        view.close_composer();
        assert!(view.composer_category.is_none());

        view.toggle_chat();
        assert!(view.chat_open);
        view.toggle_chat();
        assert!(!view.chat_open);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut scale = DEFAULT_SCALE;
        for _ in 0..20 {
            scale = zoom_in(scale);
        }
        assert_eq!(scale, MAX_SCALE);
        for _ in 0..30 {
            scale = zoom_out(scale);
        }
        assert_eq!(scale, MIN_SCALE);
        assert_eq!(reset_zoom(), 1.0);
    }

    #[test]
    fn test_zoom_steps_do_not_drift() {
        assert_eq!(zoom_in(zoom_in(zoom_in(1.0))), 1.3);
        assert_eq!(zoom_out(1.0), 0.9);
    }
}
