use serde::Serialize;
use ulid::Ulid;

use crate::{Category, EventDate, EventDocument, EventTime, MemberSet, repository};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Single event as seen by one requester. The like roster and revision stay
/// private; the requester only learns about their own membership.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub id: Ulid,
    pub owner: Option<Owner>,
    pub title: String,
    pub description: String,
    pub organized_by: String,
    pub event_date: EventDate,
    pub event_time: EventTime,
    pub location: String,
    pub category: Category,
    pub ticket_price: f64,
    pub image: Option<String>,
    pub likes: i64,
    pub participants: MemberSet,
    pub participant_count: usize,
    pub user_has_liked: bool,
    pub user_has_participated: bool,
}

impl EventDetail {
    pub fn new(doc: EventDocument, owner: Option<Owner>, requester_id: &Ulid) -> Self {
        Self {
            user_has_liked: doc.liked_by.contains(requester_id),
            user_has_participated: doc.participants.contains(requester_id),
            participant_count: doc.participants.len(),
            id: doc.id,
            owner,
            title: doc.title,
            description: doc.description,
            organized_by: doc.organized_by,
            event_date: doc.event_date,
            event_time: doc.event_time,
            location: doc.location,
            category: doc.category,
            ticket_price: doc.ticket_price,
            image: doc.image,
            likes: doc.likes,
            participants: doc.participants,
        }
    }
}

impl super::Query {
    pub async fn find(
        &self,
        id: Ulid,
        requester_id: Ulid,
    ) -> eventhub_shared::Result<EventDetail> {
        let Some(doc) = repository::load(&self.read_db, &id).await? else {
            eventhub_shared::not_found!("event");
        };

        let owner = self
            .user_query
            .find(doc.owner.to_string())
            .await?
            .map(|user| Owner {
                id: user.id,
                name: user.name,
                email: user.email,
            });

        if owner.is_none() {
            tracing::warn!(event_id = %id, owner_id = %doc.owner, "event owner is missing");
        }

        Ok(EventDetail::new(doc, owner, &requester_id))
    }
}
