use axum::routing::get;
use axum::Router;

use crate::handlers::retrospective;
use crate::state::AppState;

/// Routes mounted under `/sprints`.
///
/// ```text
/// GET    /{sprint_id}/retrospective    stored session, if any
/// POST   /{sprint_id}/retrospective    join or provision
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{sprint_id}/retrospective",
        get(retrospective::get_retrospective).post(retrospective::enter_retrospective),
    )
}
