use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use scrumboard_core::error::CoreError;
use scrumboard_core::retrospective::bootstrap::is_stored_session;
use scrumboard_core::retrospective::nickname::resolve_nickname;
use scrumboard_core::retrospective::protocol::{ClientMessage, ServerMessage};
use scrumboard_core::retrospective::ParticipantId;
use scrumboard_core::types::DbId;
use scrumboard_db::repositories::{ProjectMemberRepo, SprintRepo, UserRepo};
use scrumboard_events::{names, DomainEvent};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::rooms::{Flow, PendingJoin, RoomError};
use crate::state::AppState;

/// Query string of a session join, i.e. the stored retrospective URL plus
/// the caller's token.
#[derive(Debug, Deserialize)]
pub struct JoinParams {
    #[serde(rename = "rtName")]
    pub session: String,
    #[serde(rename = "rtPwd")]
    pub password: String,
    /// Browsers cannot set headers on upgrades, so the token rides here.
    pub token: Option<String>,
    /// Sprint whose project supplies the caller's display name.
    pub sprint_id: Option<DbId>,
}

/// GET /api/v1/ws/retrospective
///
/// Authenticates, opens the session room and resolves the caller's
/// nickname before upgrading.
pub async fn retrospective_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<JoinParams>,
) -> AppResult<impl IntoResponse> {
    let token = params.token.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Missing token parameter".into()))
    })?;
    let user = AuthUser::from_token(token, &state.config.jwt)?;

    let pending = match state.rooms.open(&params.session, &params.password).await {
        Err(RoomError::UnknownSession) => {
            restore_stored_session(&state, &params.session, &params.password).await?
        }
        opened => opened.map_err(|e| CoreError::Forbidden(e.to_string()))?,
    };

    let nickname = participant_nickname(&state, &user, params.sprint_id).await;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, pending, user, nickname)))
}

/// Recreate a room that is gone, but only for a session stored on a sprint.
async fn restore_stored_session(
    state: &AppState,
    name: &str,
    password: &str,
) -> AppResult<PendingJoin> {
    let sprints = SprintRepo::find_by_retrospective_session(&state.pool, name).await?;
    let stored = sprints.iter().any(|sprint| {
        sprint
            .retrospective_url
            .as_deref()
            .is_some_and(|url| is_stored_session(url, name, password))
    });
    if !stored {
        tracing::warn!(session = %name, "Join attempt for an unknown retrospective session");
        return Err(CoreError::Forbidden(RoomError::UnknownSession.to_string()).into());
    }

    state
        .rooms
        .restore(name, password)
        .await
        .map_err(|e| CoreError::Forbidden(e.to_string()).into())
}

/// Drive one participant's socket.
///
/// A sender task drains the participant's channel into the sink while this
/// task decodes inbound frames and hands them to the room. Undecodable or
/// rejected messages get an `error` reply; the session stays open.
async fn handle_socket(
    socket: WebSocket,
    state: AppState,
    pending: PendingJoin,
    user: AuthUser,
    nickname: String,
) {
    let participant_id = ParticipantId::generate();
    let session = pending.room().name().to_string();

    let (sender, mut rx) = state.ws_manager.add(participant_id.to_string()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_participant = participant_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(participant_id = %sender_participant, "WebSocket sink closed");
                break;
            }
        }
    });

    let room = pending.join(participant_id.clone(), nickname, sender).await;
    publish_presence(&state, names::PARTICIPANT_JOINED, &session, &participant_id, user.user_id);

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let reply = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(message) => match room.handle(&participant_id, message).await {
                        Ok(Flow::Continue) => None,
                        Ok(Flow::Leave) => break,
                        Err(e) => Some(ServerMessage::error(e.code(), e.to_string())),
                    },
                    Err(e) => {
                        tracing::debug!(participant_id = %participant_id, error = %e, "Undecodable client message");
                        Some(ServerMessage::error("invalid_message", e.to_string()))
                    }
                };
                if let Some(reply) = reply {
                    room.send_to(&participant_id, &reply).await;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(participant_id = %participant_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(participant_id = %participant_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    room.leave(&participant_id).await;
    state.ws_manager.remove(participant_id.as_str()).await;
    send_task.abort();
    publish_presence(&state, names::PARTICIPANT_LEFT, &session, &participant_id, user.user_id);
}

fn publish_presence(
    state: &AppState,
    event_type: &str,
    session: &str,
    participant_id: &ParticipantId,
    user_id: DbId,
) {
    state.event_bus.publish(
        DomainEvent::new(event_type)
            .with_actor(user_id)
            .with_payload(serde_json::json!({
                "session": session,
                "participant_id": participant_id,
            })),
    );
}

/// Resolve the caller's nickname: project display name, then account email,
/// then "Anonymous". Lookup failures fall through to the next source.
async fn participant_nickname(state: &AppState, user: &AuthUser, sprint_id: Option<DbId>) -> String {
    let display_name = match sprint_id {
        Some(sprint_id) => member_display_name(state, sprint_id, user.user_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(sprint_id, user_id = user.user_id, error = %e, "Display name lookup failed");
                None
            }),
        None => None,
    };

    let email = match UserRepo::find_by_id(&state.pool, user.user_id).await {
        Ok(found) => found.and_then(|u| u.email),
        Err(e) => {
            tracing::warn!(user_id = user.user_id, error = %e, "User lookup failed");
            None
        }
    }
    .or_else(|| user.email.clone());

    resolve_nickname(display_name.as_deref(), email.as_deref())
}

async fn member_display_name(
    state: &AppState,
    sprint_id: DbId,
    user_id: DbId,
) -> Result<Option<String>, sqlx::Error> {
    let Some(sprint) = SprintRepo::find_by_id(&state.pool, sprint_id).await? else {
        return Ok(None);
    };
    Ok(
        ProjectMemberRepo::find_for_user(&state.pool, sprint.project_id, user_id)
            .await?
            .and_then(|m| m.display_name),
    )
}
