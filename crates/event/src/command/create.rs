use serde::Deserialize;
use time::OffsetDateTime;
use ulid::Ulid;
use validator::Validate;

use crate::{Category, EventDate, EventDocument, EventTime, MemberSet, repository};

#[derive(Validate, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub organized_by: String,
    pub event_date: EventDate,
    pub event_time: EventTime,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    pub category: Category,
    #[validate(range(min = 0.0))]
    pub ticket_price: f64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub quantity: i64,
    #[validate(length(max = 2048))]
    pub image: Option<String>,
}

impl super::Command {
    /// Stores a new event owned by `owner_id` and links it to the owner. An
    /// image must be a url issued by the blob store.
    ///
    /// The event insert and the owner update are two separate writes. A
    /// failure between them leaves the event unlinked.
    #[tracing::instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn create(
        &self,
        owner_id: Ulid,
        input: CreateEventInput,
    ) -> eventhub_shared::Result<EventDocument> {
        input.validate()?;

        if let Some(image) = input.image.as_deref() {
            if self.blobs.blob_id(image).is_none() {
                eventhub_shared::user!("Image must be uploaded through /upload/image");
            }
        }

        if self.user_query.find(owner_id.to_string()).await?.is_none() {
            eventhub_shared::not_found!("user {}", owner_id);
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let doc = EventDocument {
            id: Ulid::new(),
            owner: owner_id,
            title: input.title,
            description: input.description,
            organized_by: input.organized_by,
            event_date: input.event_date,
            event_time: input.event_time,
            location: input.location,
            category: input.category,
            ticket_price: input.ticket_price,
            quantity: input.quantity,
            image: input.image,
            likes: 0,
            liked_by: MemberSet::default(),
            participants: MemberSet::default(),
            booking_count: 0,
            income: 0.0,
            revision: 0,
            created_at: now,
            updated_at: now,
        };

        repository::insert(&self.write_db, &doc).await?;
        self.users
            .attach_event(owner_id.to_string(), doc.id.to_string())
            .await?;

        tracing::info!(event_id = %doc.id, "event created");

        Ok(doc)
    }
}
