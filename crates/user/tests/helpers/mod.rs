use std::{path::PathBuf, str::FromStr};

use eventhub_shared::State;
use eventhub_user::SignupInput;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    eventhub_db::migrator::<sqlx::Sqlite>()?
        .run(&mut *conn, &Plan::apply_all())
        .await?;

    Ok(State {
        read_db: pool.clone(),
        write_db: pool,
    })
}

#[allow(dead_code)]
pub async fn create_user(
    cmd: &eventhub_user::Command,
    name: impl Into<String>,
) -> anyhow::Result<String> {
    let name = name.into();
    let id = cmd
        .signup(SignupInput {
            email: format!("{name}@eventhub.localhost"),
            name,
            password: "my_password".to_owned(),
        })
        .await?;

    Ok(id)
}
