use std::{path::PathBuf, str::FromStr, sync::Arc};

use eventhub_event::{
    Broadcaster, Category, Command, CreateEventInput, EventDocument, LocalBlobStore,
};
use eventhub_shared::State;
use eventhub_user::SignupInput;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};
use ulid::Ulid;

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
pub async fn setup_command(
    state: &State,
    dir: &temp_dir::TempDir,
) -> anyhow::Result<(Command, Arc<LocalBlobStore>)> {
    let blobs =
        Arc::new(LocalBlobStore::new(dir.child("media"), "http://localhost:3000/media").await?);
    let cmd = Command::new(state.clone(), blobs.clone(), Broadcaster::default());

    Ok((cmd, blobs))
}

#[allow(dead_code)]
pub async fn create_user(state: &State, name: impl Into<String>) -> anyhow::Result<Ulid> {
    let name = name.into();
    let id = eventhub_user::Command::new(state.clone())
        .signup(SignupInput {
            email: format!("{name}@eventhub.localhost"),
            name,
            password: "my_password".to_owned(),
        })
        .await?;

    Ok(Ulid::from_str(&id)?)
}

#[allow(dead_code)]
pub fn input(title: &str, category: Category, ticket_price: f64) -> CreateEventInput {
    CreateEventInput {
        title: title.to_owned(),
        description: format!("{title} description"),
        organized_by: "Eventhub".to_owned(),
        event_date: "2025-09-12".parse().unwrap(),
        event_time: "19:00".parse().unwrap(),
        location: "Paris".to_owned(),
        category,
        ticket_price,
        quantity: 100,
        image: None,
    }
}

#[allow(dead_code)]
pub async fn create_event(
    cmd: &Command,
    owner: Ulid,
    title: &str,
    category: Category,
    ticket_price: f64,
) -> anyhow::Result<EventDocument> {
    Ok(cmd.create(owner, input(title, category, ticket_price)).await?)
}
