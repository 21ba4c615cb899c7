use ulid::Ulid;

use crate::repository;

impl super::Command {
    /// Removes an event. Only its owner may do so. The stored image goes with
    /// it unless another event still shows it. Failing to remove the image is
    /// logged and does not stop the deletion.
    #[tracing::instrument(skip_all, fields(event_id = %event_id, requester_id = %requester_id))]
    pub async fn delete(
        &self,
        event_id: Ulid,
        requester_id: Ulid,
    ) -> eventhub_shared::Result<()> {
        let _guard = self.locks.lock(event_id).await;

        let Some(doc) = repository::load(&self.write_db, &event_id).await? else {
            eventhub_shared::not_found!("event");
        };

        if !doc.is_owned_by(&requester_id) {
            return Err(eventhub_shared::Error::Forbidden);
        }

        if let Some(blob_id) = doc.image.as_deref().and_then(|url| self.blobs.blob_id(url)) {
            if repository::image_in_use(&self.write_db, blob_id, &doc.id).await? {
                tracing::debug!(blob_id, "image still used by another event, keeping it");
            } else if let Err(err) = self.blobs.delete(blob_id).await {
                tracing::warn!(blob_id, err = %err, "failed to delete event image");
            }
        }

        repository::delete(&self.write_db, &doc.id).await?;
        self.users
            .detach_event(doc.owner.to_string(), doc.id.to_string())
            .await?;

        tracing::info!("event deleted");

        Ok(())
    }
}
