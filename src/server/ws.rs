use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use super::ServerState;
use crate::feed::{FeedEvent, Subscription};

/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: ServerState) {
    let Subscription {
        history,
        mut updates,
    } = state.gateway.connect();
    tracing::info!(
        history = history.len(),
        consumers = state.gateway.consumer_count(),
        "Consumer connected"
    );

    let (mut sender, mut receiver) = socket.split();

    let backfill = match FeedEvent::MarketHistory(&history).to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize market history");
            return;
        }
    };
    drop(history);
    if sender.send(Message::Text(backfill.into())).await.is_err() {
        tracing::debug!("Consumer gone before history was delivered");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(batch) => match FeedEvent::MarketUpdate(&batch).to_json() {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(seq = batch.seq, error = %e, "Failed to serialize market update");
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Consumer lagged, skipping to newest batch");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Client frames carry nothing for us; only watch for close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket read error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::info!("Consumer disconnected");
}
