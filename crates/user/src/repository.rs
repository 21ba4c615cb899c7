use eventhub_db::table::User;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow, types::Json};
use time::OffsetDateTime;
use ulid::Ulid;

#[derive(FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub events: Json<Vec<Ulid>>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub enum FindType {
    Id(String),
    Email(String),
}

pub(crate) async fn find(
    pool: &SqlitePool,
    arg_type: FindType,
) -> eventhub_shared::Result<Option<UserRow>> {
    let mut statement = Query::select()
        .columns([
            User::Id,
            User::Name,
            User::Email,
            User::Password,
            User::Events,
            User::CreatedAt,
            User::UpdatedAt,
        ])
        .from(User::Table)
        .limit(1)
        .to_owned();

    match arg_type {
        FindType::Id(id) => statement.and_where(Expr::col(User::Id).eq(id)),
        FindType::Email(email) => statement.and_where(Expr::col(User::Email).eq(email)),
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, UserRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) async fn create(
    pool: &SqlitePool,
    id: String,
    name: String,
    email: String,
    password: String,
) -> eventhub_shared::Result<()> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let statement = Query::insert()
        .into_table(User::Table)
        .columns([
            User::Id,
            User::Name,
            User::Email,
            User::Password,
            User::Events,
            User::CreatedAt,
            User::UpdatedAt,
        ])
        .values_panic([
            id.into(),
            name.into(),
            email.into(),
            password.into(),
            "[]".into(),
            now.into(),
            now.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    if let Err(err) = sqlx::query_with(&sql, values).execute(pool).await {
        if err
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation())
        {
            eventhub_shared::user!("User already exists");
        }

        return Err(err.into());
    }

    Ok(())
}

/// Appends `event_id` to the user's event set in one statement. A no-op when
/// the id is already present.
pub(crate) async fn push_event(
    pool: &SqlitePool,
    user_id: &str,
    event_id: &str,
) -> eventhub_shared::Result<u64> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        r#"UPDATE "user"
        SET events = json_insert(events, '$[#]', ?1), updated_at = ?2
        WHERE id = ?3
            AND NOT EXISTS (SELECT 1 FROM json_each("user".events) WHERE value = ?1)"#,
    )
    .bind(event_id)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn pull_event(
    pool: &SqlitePool,
    user_id: &str,
    event_id: &str,
) -> eventhub_shared::Result<u64> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        r#"UPDATE "user"
        SET events = (
                SELECT json_group_array(value) FROM json_each("user".events) WHERE value != ?1
            ),
            updated_at = ?2
        WHERE id = ?3"#,
    )
    .bind(event_id)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
