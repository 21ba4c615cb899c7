use serde::Deserialize;
use validator::Validate;

use crate::{password, repository};

#[derive(Validate, Deserialize)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl super::Command {
    pub async fn login(&self, input: LoginInput) -> eventhub_shared::Result<String> {
        input.validate()?;

        let Some(user) =
            repository::find(&self.read_db, repository::FindType::Email(input.email)).await?
        else {
            eventhub_shared::unauthenticated!("Invalid email or password");
        };

        if !password::verify(&input.password, &user.password)? {
            tracing::warn!(user_id = %user.id, "failed login attempt");
            eventhub_shared::unauthenticated!("Invalid email or password");
        }

        Ok(user.id)
    }
}
