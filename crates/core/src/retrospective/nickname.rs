//! Display nickname resolution for session participants.

use super::MAX_NICKNAME_CHARS;

/// Fallback label when a participant has neither a display name nor email.
pub const ANONYMOUS: &str = "Anonymous";

/// Resolve a participant's nickname.
///
/// Priority: project-role display name, then account email, then
/// `"Anonymous"`. Blank values count as missing.
pub fn resolve_nickname(display_name: Option<&str>, email: Option<&str>) -> String {
    [display_name, email]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(clamp_nickname)
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

/// Trim and truncate a client-supplied nickname. Returns `None` if blank.
pub fn sanitize_nickname(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(clamp_nickname(trimmed))
    }
}

fn clamp_nickname(s: &str) -> String {
    s.chars().take(MAX_NICKNAME_CHARS).collect()
}
