use serde::Serialize;
use ulid::Ulid;

use crate::{EventDocument, Notification, Toggled, repository};

const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationToggle {
    pub participating: bool,
    pub participant_count: usize,
}

impl super::Command {
    #[tracing::instrument(skip_all, fields(event_id = %event_id, user_id = %user_id))]
    pub async fn toggle_like(
        &self,
        event_id: Ulid,
        user_id: Ulid,
    ) -> eventhub_shared::Result<LikeToggle> {
        self.apply(event_id, |doc| {
            let Toggled { active, .. } = doc.toggle_like(user_id);
            let toggle = LikeToggle {
                liked: active,
                likes_count: doc.likes,
            };
            let notification = Notification::LikeUpdate {
                event_id,
                likes_count: doc.likes,
            };

            (toggle, notification)
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(event_id = %event_id, user_id = %user_id))]
    pub async fn toggle_participation(
        &self,
        event_id: Ulid,
        user_id: Ulid,
    ) -> eventhub_shared::Result<ParticipationToggle> {
        self.apply(event_id, |doc| {
            let Toggled { active, count } = doc.toggle_participation(user_id);
            let toggle = ParticipationToggle {
                participating: active,
                participant_count: count,
            };
            let notification = Notification::ParticipantUpdate {
                event_id,
                participant_count: count,
            };

            (toggle, notification)
        })
        .await
    }

    /// Runs one read-modify-write on an event while holding its lock, then
    /// notifies the event topic. Nothing is published unless the write
    /// committed.
    async fn apply<T, F>(&self, event_id: Ulid, transition: F) -> eventhub_shared::Result<T>
    where
        F: Fn(&mut EventDocument) -> (T, Notification),
    {
        let _guard = self.locks.lock(event_id).await;

        for attempt in 1..=MAX_ATTEMPTS {
            let Some(mut doc) = repository::load(&self.write_db, &event_id).await? else {
                eventhub_shared::not_found!("event");
            };

            let (output, notification) = transition(&mut doc);

            if repository::save(&self.write_db, &mut doc).await? {
                let receivers = self.broadcaster.publish(notification);
                tracing::debug!(revision = doc.revision, receivers, "toggle saved");

                return Ok(output);
            }

            tracing::warn!(attempt, "event changed while toggling, reloading");
        }

        eventhub_shared::server!("event {} kept changing during toggle", event_id)
    }
}
