//! Rules for entering a sprint's retrospective.
//!
//! The realtime substrate hands out join URLs pointing at the page that
//! requested the session (the sprint planning view). Before the URL is
//! stored on the sprint it is rewritten to the retrospective route and
//! reduced to a path, so it stays valid behind any origin.

use crate::roles::Role;

/// Route of the sprint planning view, where sessions are requested from.
pub const PLANNING_ROUTE: &str = "/sprint-planning";

/// Route of the retrospective board.
pub const RETROSPECTIVE_ROUTE: &str = "/retrospective";

/// Query parameter carrying the session name in a join URL.
pub const SESSION_NAME_PARAM: &str = "rtName";

/// Query parameter carrying the session password in a join URL.
pub const SESSION_PASSWORD_PARAM: &str = "rtPwd";

/// What entering a sprint's retrospective should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPlan {
    /// A session already exists; navigate to this stored path.
    Join(String),
    /// No session yet and the caller may create one.
    Provision,
    /// No session yet and the caller may not create one.
    Unavailable,
}

/// Decide how `role` enters a retrospective given the sprint's stored URL.
///
/// Anyone may join an existing session. Only the facilitator provisions.
pub fn plan_entry(role: Role, existing_url: Option<&str>) -> EntryPlan {
    match existing_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => EntryPlan::Join(url.to_string()),
        None if role.can_provision_retrospective() => EntryPlan::Provision,
        None => EntryPlan::Unavailable,
    }
}

/// Build the join URL the substrate publishes for a new session.
pub fn planning_join_url(public_base_url: &str, session_name: &str, password: &str) -> String {
    format!(
        "{}{PLANNING_ROUTE}?{SESSION_NAME_PARAM}={session_name}&{SESSION_PASSWORD_PARAM}={password}",
        public_base_url.trim_end_matches('/')
    )
}

/// Rewrite a join URL into the path stored on the sprint.
///
/// The first `/sprint-planning` segment becomes `/retrospective`, then
/// everything before `/retrospective` is dropped. Returns `None` if the
/// result has no retrospective segment at all.
pub fn retrospective_path_from_join_url(join_url: &str) -> Option<String> {
    let rewritten = join_url.replacen(PLANNING_ROUTE, RETROSPECTIVE_ROUTE, 1);
    let start = rewritten.find(RETROSPECTIVE_ROUTE)?;
    Some(rewritten[start..].to_string())
}

/// Join a stored retrospective path onto the public origin.
pub fn absolute_url(public_base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}{path}", public_base_url.trim_end_matches('/'))
}

/// Extract `(session_name, password)` from a join URL or stored path.
pub fn session_credentials(url: &str) -> Option<(String, String)> {
    let (_, query) = url.split_once('?')?;
    let mut name = None;
    let mut password = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some((SESSION_NAME_PARAM, v)) if !v.is_empty() => name = Some(v.to_string()),
            Some((SESSION_PASSWORD_PARAM, v)) if !v.is_empty() => password = Some(v.to_string()),
            _ => {}
        }
    }
    Some((name?, password?))
}

/// Whether a stored retrospective URL carries exactly these credentials.
pub fn is_stored_session(stored_url: &str, name: &str, password: &str) -> bool {
    session_credentials(stored_url).is_some_and(|(n, p)| n == name && p == password)
}
