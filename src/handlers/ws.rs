use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::server::State;

/// Handler for `GET /ws`
///
/// Upgrades to a WebSocket that only ever carries server-to-client notices;
/// whatever the client sends is drained and ignored.
pub(crate) async fn realtime(
    ws: WebSocketUpgrade,
    Extension(state): Extension<Arc<State>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<State>) {
    tracing::debug!("realtime client connected");
    let mut notices = state.notifier.subscribe();

    loop {
        tokio::select! {
            notice = notices.recv() => match notice {
                Ok(notice) => {
                    let payload = match serde_json::to_string(&notice) {
                        Ok(payload) => payload,
                        Err(err) => {
                            tracing::error!("failed to encode notice: {:?}", err);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                // slow consumers miss notices rather than stalling the channel
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("realtime client lagged, skipped {} notices", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }

    tracing::debug!("realtime client disconnected");
}
