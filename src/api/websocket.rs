// SPDX-License-Identifier: GPL-3.0-only
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use crate::orchestrator::UiEvent;

/// Serialize an event for the socket
pub fn encode_event(event: &UiEvent) -> anyhow::Result<Message> {
    Ok(Message::Text(serde_json::to_string(event)?))
}

/// Push every UI event to the socket until either side goes away
pub async fn stream_events(socket: WebSocket, mut events: broadcast::Receiver<UiEvent>) {
    let (mut sender, mut receiver) = socket.split();
    info!("WebSocket client connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client lagging, dropped events");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let message = match encode_event(&event) {
                Ok(message) => message,
                Err(e) => {
                    error!(error = %e, "Failed to encode UI event");
                    continue;
                }
            };

            if let Err(e) = sender.send(message).await {
                error!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
    info!("WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{BatchState, MessageKind};

    #[test]
    fn test_encode_event_is_json_text() {
        let message = encode_event(&UiEvent::State(BatchState::Idle)).unwrap();
        let Message::Text(text) = message else {
            panic!("expected a text frame");
        };
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["type"], "state");
        assert_eq!(json["data"]["state"], "idle");
    }

    #[test]
    fn test_encode_message_event() {
        let event = UiEvent::Message {
            text: "Download completed".to_string(),
            kind: MessageKind::Success,
        };
        let Message::Text(text) = encode_event(&event).unwrap() else {
            panic!("expected a text frame");
        };
        let decoded: UiEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, event);
    }
}
