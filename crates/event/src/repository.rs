use eventhub_db::table::Event;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{
    SqlitePool,
    prelude::FromRow,
    types::{Json, Text},
};
use time::OffsetDateTime;
use ulid::Ulid;

use crate::{Category, EventDate, EventDocument, EventTime, MemberSet};

pub(crate) const COLUMNS: [Event; 20] = [
    Event::Id,
    Event::OwnerId,
    Event::Title,
    Event::Description,
    Event::OrganizedBy,
    Event::EventDate,
    Event::EventTime,
    Event::Location,
    Event::Category,
    Event::TicketPrice,
    Event::Quantity,
    Event::Image,
    Event::Likes,
    Event::LikedBy,
    Event::Participants,
    Event::BookingCount,
    Event::Income,
    Event::Revision,
    Event::CreatedAt,
    Event::UpdatedAt,
];

#[derive(FromRow)]
pub(crate) struct EventRow {
    pub id: Text<Ulid>,
    pub owner_id: Text<Ulid>,
    pub title: String,
    pub description: String,
    pub organized_by: String,
    pub event_date: Text<EventDate>,
    pub event_time: Text<EventTime>,
    pub location: String,
    pub category: Text<Category>,
    pub ticket_price: f64,
    pub quantity: i64,
    pub image: Option<String>,
    pub likes: i64,
    pub liked_by: Json<MemberSet>,
    pub participants: Json<MemberSet>,
    pub booking_count: i64,
    pub income: f64,
    pub revision: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<EventRow> for EventDocument {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id.0,
            owner: row.owner_id.0,
            title: row.title,
            description: row.description,
            organized_by: row.organized_by,
            event_date: row.event_date.0,
            event_time: row.event_time.0,
            location: row.location,
            category: row.category.0,
            ticket_price: row.ticket_price,
            quantity: row.quantity,
            image: row.image,
            likes: row.likes,
            liked_by: row.liked_by.0,
            participants: row.participants.0,
            booking_count: row.booking_count,
            income: row.income,
            revision: row.revision,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) async fn load(
    pool: &SqlitePool,
    id: &Ulid,
) -> eventhub_shared::Result<Option<EventDocument>> {
    let statement = Query::select()
        .columns(COLUMNS)
        .from(Event::Table)
        .and_where(Expr::col(Event::Id).eq(id.to_string()))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, EventRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(EventDocument::from))
}

pub(crate) async fn find_many(
    pool: &SqlitePool,
    ids: &[Ulid],
) -> eventhub_shared::Result<Vec<EventDocument>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let statement = Query::select()
        .columns(COLUMNS)
        .from(Event::Table)
        .and_where(Expr::col(Event::Id).is_in(ids.iter().map(|id| id.to_string())))
        .order_by(Event::Id, sea_query::Order::Desc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let rows = sqlx::query_as_with::<_, EventRow, _>(&sql, values)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(EventDocument::from).collect())
}

pub(crate) async fn insert(pool: &SqlitePool, doc: &EventDocument) -> eventhub_shared::Result<()> {
    let statement = Query::insert()
        .into_table(Event::Table)
        .columns(COLUMNS)
        .values_panic([
            doc.id.to_string().into(),
            doc.owner.to_string().into(),
            doc.title.clone().into(),
            doc.description.clone().into(),
            doc.organized_by.clone().into(),
            doc.event_date.to_string().into(),
            doc.event_time.to_string().into(),
            doc.location.clone().into(),
            doc.category.to_string().into(),
            doc.ticket_price.into(),
            doc.quantity.into(),
            doc.image.clone().into(),
            doc.likes.into(),
            serde_json::to_string(&doc.liked_by)?.into(),
            serde_json::to_string(&doc.participants)?.into(),
            doc.booking_count.into(),
            doc.income.into(),
            doc.revision.into(),
            doc.created_at.into(),
            doc.updated_at.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

/// Writes the whole document back if nobody saved it since it was loaded.
/// Returns `false` when the stored revision moved or the row is gone; the
/// caller decides whether to reload.
pub(crate) async fn save(
    pool: &SqlitePool,
    doc: &mut EventDocument,
) -> eventhub_shared::Result<bool> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let next_revision = doc.revision + 1;
    let statement = Query::update()
        .table(Event::Table)
        .values([
            (Event::Title, doc.title.clone().into()),
            (Event::Description, doc.description.clone().into()),
            (Event::OrganizedBy, doc.organized_by.clone().into()),
            (Event::EventDate, doc.event_date.to_string().into()),
            (Event::EventTime, doc.event_time.to_string().into()),
            (Event::Location, doc.location.clone().into()),
            (Event::Category, doc.category.to_string().into()),
            (Event::TicketPrice, doc.ticket_price.into()),
            (Event::Quantity, doc.quantity.into()),
            (Event::Image, doc.image.clone().into()),
            (Event::Likes, doc.likes.into()),
            (Event::LikedBy, serde_json::to_string(&doc.liked_by)?.into()),
            (
                Event::Participants,
                serde_json::to_string(&doc.participants)?.into(),
            ),
            (Event::BookingCount, doc.booking_count.into()),
            (Event::Income, doc.income.into()),
            (Event::Revision, next_revision.into()),
            (Event::UpdatedAt, now.into()),
        ])
        .and_where(Expr::col(Event::Id).eq(doc.id.to_string()))
        .and_where(Expr::col(Event::Revision).eq(doc.revision))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    doc.revision = next_revision;
    doc.updated_at = now;

    Ok(true)
}

/// Whether an event other than `except` points at the blob `blob_id`,
/// whatever the extension in its url.
pub(crate) async fn image_in_use(
    pool: &SqlitePool,
    blob_id: &str,
    except: &Ulid,
) -> eventhub_shared::Result<bool> {
    let statement = Query::select()
        .column(Event::Id)
        .from(Event::Table)
        .and_where(Expr::col(Event::Image).like(format!("%/{blob_id}.%")))
        .and_where(Expr::col(Event::Id).ne(except.to_string()))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub(crate) async fn delete(pool: &SqlitePool, id: &Ulid) -> eventhub_shared::Result<u64> {
    let statement = Query::delete()
        .from_table(Event::Table)
        .and_where(Expr::col(Event::Id).eq(id.to_string()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected())
}
