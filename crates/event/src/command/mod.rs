mod create;
mod delete;
mod toggle;

use std::{ops::Deref, sync::Arc};

pub use create::CreateEventInput;
pub use toggle::{LikeToggle, ParticipationToggle};

use crate::{BlobStore, Broadcaster, EventLocks};

pub struct Command {
    state: eventhub_shared::State,
    users: eventhub_user::Command,
    user_query: eventhub_user::Query,
    blobs: Arc<dyn BlobStore>,
    broadcaster: Broadcaster,
    locks: EventLocks,
}

impl Deref for Command {
    type Target = eventhub_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(
        state: eventhub_shared::State,
        blobs: Arc<dyn BlobStore>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            users: eventhub_user::Command::new(state.clone()),
            user_query: eventhub_user::Query::new(state.clone()),
            state,
            blobs,
            broadcaster,
            locks: EventLocks::default(),
        }
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }
}
