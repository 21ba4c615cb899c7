use std::ops::Deref;

use serde::Serialize;
use ulid::Ulid;

use crate::repository::{self, UserRow};

pub struct Query {
    state: eventhub_shared::State,
}

impl Deref for Query {
    type Target = eventhub_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

/// A user as exposed outside the crate. The password hash never leaves the
/// repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub events: Vec<Ulid>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            events: row.events.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Query {
    pub fn new(state: eventhub_shared::State) -> Self {
        Self { state }
    }

    pub async fn find(&self, id: impl Into<String>) -> eventhub_shared::Result<Option<User>> {
        let row = repository::find(&self.read_db, repository::FindType::Id(id.into())).await?;

        Ok(row.map(User::from))
    }

    pub async fn find_by_email(
        &self,
        email: impl Into<String>,
    ) -> eventhub_shared::Result<Option<User>> {
        let row =
            repository::find(&self.read_db, repository::FindType::Email(email.into())).await?;

        Ok(row.map(User::from))
    }
}
