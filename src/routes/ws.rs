use std::{collections::HashMap, str::FromStr};

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use eventhub_event::{Broadcaster, Notification};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use ulid::Ulid;

use crate::server::AppState;

const OUTBOX_CAPACITY: usize = 64;

/// Messages a client may send. Joining is open to any connected client.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinEvent { event_id: String },

    #[serde(rename_all = "camelCase")]
    LeaveEvent { event_id: String },
}

/// GET /ws - realtime counters per event
pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.broadcaster.clone()))
}

/// Canonical topic for a client supplied event id, the form notifications
/// are published under.
fn room(event_id: &str) -> Option<String> {
    Ulid::from_str(event_id.trim()).ok().map(|id| id.to_string())
}

fn forward(
    mut receiver: broadcast::Receiver<Notification>,
    outbox: mpsc::Sender<Notification>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    if outbox.send(notification).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "subscriber lagged, skipping notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, broadcaster: Broadcaster) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = mpsc::channel::<Notification>(OUTBOX_CAPACITY);

    let writer = tokio::spawn(async move {
        while let Some(notification) = inbox.recv().await {
            let text = match serde_json::to_string(&notification) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(err = %err, "failed to encode notification");
                    continue;
                }
            };

            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut rooms: HashMap<String, JoinHandle<()>> = HashMap::new();

    while let Some(Ok(message)) = stream.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<ClientMessage>(text.as_str()) {
            Ok(ClientMessage::JoinEvent { event_id }) => {
                let Some(room) = room(&event_id) else {
                    tracing::debug!(%event_id, "ignored join for invalid event id");
                    continue;
                };

                if !rooms.contains_key(&room) {
                    let receiver = broadcaster.subscribe(room.to_owned());
                    tracing::debug!(%room, "joined event room");
                    rooms.insert(room, forward(receiver, outbox.clone()));
                }
            }
            Ok(ClientMessage::LeaveEvent { event_id }) => {
                let Some(room) = room(&event_id) else {
                    continue;
                };

                if let Some(task) = rooms.remove(&room) {
                    task.abort();
                    tracing::debug!(%room, "left event room");
                }
            }
            Err(err) => tracing::debug!(err = %err, "ignored client message"),
        }
    }

    for task in rooms.into_values() {
        task.abort();
    }
    writer.abort();
    broadcaster.prune();
}
