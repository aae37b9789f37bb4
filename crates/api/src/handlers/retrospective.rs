//! Handlers for entering a sprint's retrospective.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use scrumboard_core::error::CoreError;
use scrumboard_core::retrospective::bootstrap::absolute_url;
use scrumboard_core::roles::Role;
use scrumboard_core::types::DbId;
use scrumboard_db::models::sprint::Sprint;
use scrumboard_db::repositories::{ProjectMemberRepo, SprintRepo};
use scrumboard_events::{names, DomainEvent};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// What the sprint page needs to render the retrospective button.
#[derive(Debug, Serialize)]
pub struct RetrospectiveStatus {
    pub sprint_id: DbId,
    pub retrospective_url: Option<String>,
    /// Absolute form of `retrospective_url`.
    pub join_url: Option<String>,
    /// Whether the caller may start a session (disabled button otherwise).
    pub can_provision: bool,
    pub provisioning: bool,
}

/// GET /api/v1/sprints/{sprint_id}/retrospective
pub async fn get_retrospective(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(sprint_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (sprint, role) = sprint_and_role(&state, sprint_id, auth.user_id).await?;

    let join_url = sprint
        .retrospective_url
        .as_deref()
        .map(|path| absolute_url(&state.config.public_base_url, path));

    Ok(Json(DataResponse {
        data: RetrospectiveStatus {
            sprint_id,
            join_url,
            can_provision: sprint.retrospective_url.is_none() && role.can_provision_retrospective(),
            retrospective_url: sprint.retrospective_url,
            provisioning: state.bootstrap.is_provisioning(sprint_id),
        },
    }))
}

/// POST /api/v1/sprints/{sprint_id}/retrospective
///
/// Joins the stored session, or provisions one when the caller is the
/// Scrum master. Returns 409 while another provisioning for the same sprint
/// is running.
pub async fn enter_retrospective(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(sprint_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (_, role) = sprint_and_role(&state, sprint_id, auth.user_id).await?;

    let outcome = state.bootstrap.enter(sprint_id, role).await?;

    if outcome.provisioned {
        state.event_bus.publish(
            DomainEvent::new(names::SESSION_PROVISIONED)
                .with_source(names::SPRINT_ENTITY, sprint_id)
                .with_actor(auth.user_id)
                .with_payload(serde_json::json!({
                    "retrospective_url": outcome.retrospective_url,
                })),
        );
    }

    tracing::info!(
        user_id = auth.user_id,
        sprint_id,
        role = %role,
        provisioned = outcome.provisioned,
        "Entering retrospective"
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// Load the sprint and the caller's role in its project.
async fn sprint_and_role(
    state: &AppState,
    sprint_id: DbId,
    user_id: DbId,
) -> AppResult<(Sprint, Role)> {
    let sprint = SprintRepo::find_by_id(&state.pool, sprint_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Sprint",
            id: sprint_id,
        })?;

    let member = ProjectMemberRepo::find_for_user(&state.pool, sprint.project_id, user_id)
        .await?
        .ok_or_else(|| {
            CoreError::Forbidden("You are not a member of this sprint's project".into())
        })?;

    let role = member.role().map_err(AppError::InternalError)?;
    Ok((sprint, role))
}
