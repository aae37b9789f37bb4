pub mod health;
pub mod retrospective;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws/retrospective?rtName=&rtPwd=&token=[&sprint_id=]   WebSocket session
///
/// /sprints/{sprint_id}/retrospective                     GET status, POST enter
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/retrospective", get(ws::retrospective_ws_handler))
        .nest("/sprints", retrospective::router())
}
