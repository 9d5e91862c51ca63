//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.
//!
//! ```text
//! store watch ──┐
//!               ├─→ send task ─→ socket
//! replies (mpsc)┘
//! socket ─→ recv task ─→ replies (mpsc)
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use super::messages::{ClientMessage, ServerMessage};
use crate::api::ApiState;
use crate::state::AppState;

/// WebSocket upgrade handler
///
/// This is the entry point for WebSocket connections.
/// It upgrades the HTTP connection to WebSocket and starts message handling.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> Response {
    let updates = state.store.read().await.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, updates))
}

/// Serialize a server message into a text frame
fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, mut updates: watch::Receiver<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = uuid::Uuid::new_v4().to_string();

    // Greeting and initial snapshot
    let initial = updates.borrow_and_update().clone();
    for message in [
        ServerMessage::Connected {
            connection_id: connection_id.clone(),
        },
        ServerMessage::snapshot(initial),
    ] {
        let Some(frame) = encode(&message) else {
            return;
        };
        if sender.send(frame).await.is_err() {
            tracing::debug!(connection_id = %connection_id, "Client left during greeting");
            return;
        }
    }

    tracing::info!(connection_id = %connection_id, "WebSocket client connected");

    // Channel for replies produced by the receive side
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let current = updates.clone();

    let conn_id_for_send = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                reply = rx.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = updates.borrow_and_update().clone();
                    ServerMessage::snapshot(state)
                }
            };

            if let Some(frame) = encode(&message) {
                if sender.send(frame).await.is_err() {
                    tracing::debug!(
                        connection_id = %conn_id_for_send,
                        "WebSocket send failed, closing connection"
                    );
                    break;
                }
            }
        }
    });

    let conn_id_for_recv = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&tx, &current, &conn_id_for_recv, msg) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    tracing::info!(connection_id = %connection_id, "WebSocket client disconnected");
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
fn handle_ws_message(
    tx: &mpsc::UnboundedSender<ServerMessage>,
    current: &watch::Receiver<AppState>,
    connection_id: &str,
    message: Message,
) -> bool {
    let reply = match message {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(client_msg) => reply_to(client_msg, current),
            Err(e) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    error = %e,
                    "Invalid client message"
                );
                ServerMessage::Error {
                    message: format!("Invalid message format: {}", e),
                }
            }
        },
        Message::Binary(_) => ServerMessage::Error {
            message: "Binary messages not supported".to_string(),
        },
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => return true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            return false;
        }
    };

    tx.send(reply).is_ok()
}

/// Answer a parsed client message
fn reply_to(message: ClientMessage, current: &watch::Receiver<AppState>) -> ServerMessage {
    match message {
        ClientMessage::Ping => ServerMessage::Pong,
        ClientMessage::Resync => ServerMessage::snapshot(current.borrow().clone()),
    }
}
