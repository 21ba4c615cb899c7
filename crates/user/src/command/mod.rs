mod login;
mod signup;

use std::ops::Deref;

pub use login::LoginInput;
pub use signup::SignupInput;

use crate::repository;

pub struct Command {
    state: eventhub_shared::State,
}

impl Deref for Command {
    type Target = eventhub_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: eventhub_shared::State) -> Self {
        Self { state }
    }

    /// Adds an event id to the owner's event set.
    pub async fn attach_event(
        &self,
        user_id: impl AsRef<str>,
        event_id: impl AsRef<str>,
    ) -> eventhub_shared::Result<()> {
        let user_id = user_id.as_ref();
        let event_id = event_id.as_ref();

        if repository::push_event(&self.write_db, user_id, event_id).await? == 0 {
            tracing::debug!(user_id, event_id, "event already attached or user missing");
        }

        Ok(())
    }

    pub async fn detach_event(
        &self,
        user_id: impl AsRef<str>,
        event_id: impl AsRef<str>,
    ) -> eventhub_shared::Result<()> {
        let user_id = user_id.as_ref();
        let event_id = event_id.as_ref();

        if repository::pull_event(&self.write_db, user_id, event_id).await? == 0 {
            tracing::warn!(user_id, event_id, "owner missing while detaching event");
        }

        Ok(())
    }
}
