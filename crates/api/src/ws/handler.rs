use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use habitual_core::error::CoreError;
use serde::Deserialize;

use crate::error::{AppError, CODE_AUTHORIZATION, CODE_VALIDATION};
use crate::middleware::auth::{authenticate_token, AuthUser};
use crate::services::completion;
use crate::state::AppState;
use crate::ws::protocol::{ClientEvent, ServerFrame, CODE_COMPLETION, CODE_UNCOMPLETION};

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Caller identity taken from `?token=<access token>` on the upgrade
/// request. Browsers cannot set headers on a WebSocket handshake.
pub struct WsAuth(pub AuthUser);

impl FromRequestParts<AppState> for WsAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<TokenQuery>::from_request_parts(parts, state)
            .await
            .map_err(|_| CoreError::Unauthorized("No token provided".into()))?;
        let token = query
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CoreError::Unauthorized("No token provided".into()))?;
        authenticate_token(&token, &state.config.jwt).map(WsAuth)
    }
}

/// GET /ws?token=<access token>
///
/// The token is checked before the upgrade; a bad one answers 401 and no
/// socket is opened.
pub async fn ws_handler(
    State(state): State<AppState>,
    WsAuth(user): WsAuth,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

/// Drive one connection: register it in the user's room, forward outbound
/// frames from the manager channel, and dispatch inbound events.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let user_id = user.user_id;
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone(), user_id).await;
    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Some(reply) = dispatch(&state, &user, text.as_str()).await {
                    state
                        .ws_manager
                        .send_to(user_id, &conn_id, reply.to_message())
                        .await;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&conn_id, user_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket disconnected");
}

/// Handle one inbound text frame from `user`. Returns the direct reply,
/// if any.
///
/// Successful mutations answer through the event bus instead, which reaches
/// every session of the user including this one.
pub async fn dispatch(state: &AppState, user: &AuthUser, text: &str) -> Option<ServerFrame> {
    let event = match ClientEvent::parse(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(user_id = user.user_id, error = %e, "Malformed WebSocket frame");
            return Some(ServerFrame::error("Invalid event payload", CODE_VALIDATION));
        }
    };

    match event {
        ClientEvent::JoinUserRoom(join) => {
            if join.user_id != user.user_id {
                tracing::warn!(
                    user_id = user.user_id,
                    requested = join.user_id,
                    "Rejected join of another user's room"
                );
                return Some(ServerFrame::error(
                    "Cannot join another user's room",
                    CODE_AUTHORIZATION,
                ));
            }
            Some(ServerFrame::joined(user.user_id))
        }
        ClientEvent::Complete(input) => completion::mark_complete(
            &state.pool,
            state.event_bus.as_ref(),
            user.user_id,
            input.habit_id,
            input.date.as_deref(),
        )
        .await
        .err()
        .map(|err| ServerFrame::error(err.public_message(), CODE_COMPLETION)),
        ClientEvent::Uncomplete(input) => completion::unmark_complete(
            &state.pool,
            state.event_bus.as_ref(),
            user.user_id,
            input.habit_id,
            &input.date,
        )
        .await
        .err()
        .map(|err| ServerFrame::error(err.public_message(), CODE_UNCOMPLETION)),
    }
}
