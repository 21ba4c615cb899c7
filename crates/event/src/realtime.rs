use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use serde::Serialize;
use tokio::sync::broadcast;
use ulid::Ulid;

const CHANNEL_CAPACITY: usize = 64;

/// Messages pushed to everyone watching an event.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    #[serde(rename_all = "camelCase")]
    LikeUpdate { event_id: Ulid, likes_count: i64 },

    #[serde(rename_all = "camelCase")]
    ParticipantUpdate {
        event_id: Ulid,
        participant_count: usize,
    },
}

impl Notification {
    pub fn event_id(&self) -> &Ulid {
        match self {
            Notification::LikeUpdate { event_id, .. }
            | Notification::ParticipantUpdate { event_id, .. } => event_id,
        }
    }
}

/// Per-event topics backed by `tokio::sync::broadcast` channels.
///
/// A topic exists while at least one subscriber holds a receiver. Slow
/// subscribers skip what they missed instead of holding back publishers.
#[derive(Clone)]
pub struct Broadcaster {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<Notification>>>>,
    capacity: usize,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, topic: impl Into<String>) -> broadcast::Receiver<Notification> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);

        channels
            .entry(topic.into())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Sends to the notification's event topic. Returns how many subscribers
    /// were reached. Publishing to a topic nobody watches is a no-op.
    pub fn publish(&self, notification: Notification) -> usize {
        let topic = notification.event_id().to_string();
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(sender) = channels.get(&topic) else {
            return 0;
        };

        match sender.send(notification) {
            Ok(receivers) => receivers,
            Err(_) => {
                channels.remove(&topic);
                tracing::debug!(%topic, "dropped topic without subscribers");
                0
            }
        }
    }

    /// Drops topics whose subscribers all went away.
    pub fn prune(&self) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.retain(|_, sender| sender.receiver_count() > 0);
    }

    pub fn topic_count(&self) -> usize {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.len()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.get(topic).map_or(0, |sender| sender.receiver_count())
    }
}
