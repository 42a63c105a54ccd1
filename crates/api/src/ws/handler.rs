//! Authenticated WebSocket upgrade handler.
//!
//! Clients open the channel with their bearer token as a query parameter;
//! the token is verified before the upgrade and the resolved user id
//! becomes the session registry key for live update delivery.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use reel_core::error::CoreError;
use reel_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::manager::WsManager;
use crate::ws::registry::SessionRegistry;

/// Query parameters for the WebSocket endpoint.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// JWT access token supplied at channel-open time.
    pub token: String,
}

/// HTTP handler that authenticates and upgrades the connection to WebSocket.
///
/// The channel is rejected with 401 before the upgrade when the token fails
/// verification. After the upgrade the connection is registered with
/// `WsManager` and bound to the user in the `SessionRegistry`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let claims = validate_token(&query.token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    Ok(ws.on_upgrade(move |socket| {
        handle_socket(socket, state.ws_manager, state.sessions, claims.sub)
    }))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` and binds the user in
///      the `SessionRegistry` (superseding any earlier channel).
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound messages on the current task.
///   4. Cleans up on disconnect. The registry removal compares channel
///      identity, so closing a superseded channel leaves the user's newer
///      binding intact.
async fn handle_socket(
    socket: WebSocket,
    ws_manager: Arc<WsManager>,
    sessions: Arc<SessionRegistry>,
    user_id: DbId,
) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = ws_manager.add(conn_id.clone(), user_id).await;
    sessions.register(user_id, conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {
                // Clients never send application messages; updates flow
                // one way, server to client.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: unbind the session, remove the connection, stop the sender.
    sessions.remove(&conn_id).await;
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket disconnected");
}
