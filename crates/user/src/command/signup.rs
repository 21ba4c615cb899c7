use serde::Deserialize;
use ulid::Ulid;
use validator::Validate;

use crate::{password, repository};

#[derive(Validate, Deserialize)]
pub struct SignupInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

impl super::Command {
    pub async fn signup(&self, input: SignupInput) -> eventhub_shared::Result<String> {
        input.validate()?;

        if repository::find(
            &self.read_db,
            repository::FindType::Email(input.email.to_owned()),
        )
        .await?
        .is_some()
        {
            eventhub_shared::user!("User already exists");
        }

        let password_hash = password::hash(&input.password)?;
        let id = Ulid::new().to_string();

        repository::create(
            &self.write_db,
            id.to_owned(),
            input.name,
            input.email,
            password_hash,
        )
        .await?;

        tracing::info!(user_id = %id, "user signed up");

        Ok(id)
    }
}
