mod detail;
mod list;

use std::ops::Deref;

pub use detail::{EventDetail, Owner};
pub use list::{EventFilter, EventStream, EventSummary, ListParams};
use ulid::Ulid;

use crate::{EventDocument, repository};

pub struct Query {
    state: eventhub_shared::State,
    user_query: eventhub_user::Query,
}

impl Deref for Query {
    type Target = eventhub_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Query {
    pub fn new(state: eventhub_shared::State) -> Self {
        Self {
            user_query: eventhub_user::Query::new(state.clone()),
            state,
        }
    }

    /// The full stored document, including the like roster.
    pub async fn load(&self, id: Ulid) -> eventhub_shared::Result<Option<EventDocument>> {
        repository::load(&self.read_db, &id).await
    }

    pub async fn find_many(&self, ids: &[Ulid]) -> eventhub_shared::Result<Vec<EventDocument>> {
        repository::find_many(&self.read_db, ids).await
    }
}
