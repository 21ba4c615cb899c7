use sea_query::{
    ColumnDef, Index, IndexCreateStatement, IndexDropStatement, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::Event;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Event::Table)
        .col(
            ColumnDef::new(Event::Id)
                .string()
                .string_len(26)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Event::OwnerId)
                .string()
                .string_len(26)
                .not_null(),
        )
        .col(ColumnDef::new(Event::Title).string().not_null())
        .col(ColumnDef::new(Event::Description).text().not_null())
        .col(ColumnDef::new(Event::OrganizedBy).string().not_null())
        .col(
            ColumnDef::new(Event::EventDate)
                .string()
                .string_len(10)
                .not_null(),
        )
        .col(
            ColumnDef::new(Event::EventTime)
                .string()
                .string_len(5)
                .not_null(),
        )
        .col(ColumnDef::new(Event::Location).string().not_null())
        .col(
            ColumnDef::new(Event::Category)
                .string()
                .string_len(25)
                .not_null(),
        )
        .col(ColumnDef::new(Event::TicketPrice).double().not_null())
        .col(
            ColumnDef::new(Event::Quantity)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Event::Image).string().null())
        .col(
            ColumnDef::new(Event::Likes)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Event::LikedBy).text().not_null().default("[]"))
        .col(
            ColumnDef::new(Event::Participants)
                .text()
                .not_null()
                .default("[]"),
        )
        .col(
            ColumnDef::new(Event::BookingCount)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Event::Income).double().not_null().default(0.0))
        .col(
            ColumnDef::new(Event::Revision)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Event::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(Event::UpdatedAt).big_integer().not_null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Event::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

fn create_idx(name: &str, column: Event) -> IndexCreateStatement {
    Index::create()
        .name(name)
        .table(Event::Table)
        .col(column)
        .to_owned()
}

fn drop_idx(name: &str) -> IndexDropStatement {
    Index::drop().name(name).table(Event::Table).to_owned()
}

async fn run(
    connection: &mut sqlx::SqliteConnection,
    statement: String,
) -> Result<(), sqlx_migrator::Error> {
    sqlx::query(&statement).execute(connection).await?;

    Ok(())
}

pub struct CreateIdx1;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateIdx1 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_idx("idx_event_owner_id", Event::OwnerId)
            .to_string(sea_query::SqliteQueryBuilder);
        run(connection, statement).await
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_idx("idx_event_owner_id").to_string(sea_query::SqliteQueryBuilder);
        run(connection, statement).await
    }
}

pub struct CreateIdx2;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateIdx2 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_idx("idx_event_category", Event::Category)
            .to_string(sea_query::SqliteQueryBuilder);
        run(connection, statement).await
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_idx("idx_event_category").to_string(sea_query::SqliteQueryBuilder);
        run(connection, statement).await
    }
}

pub struct CreateIdx3;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateIdx3 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_idx("idx_event_ticket_price", Event::TicketPrice)
            .to_string(sea_query::SqliteQueryBuilder);
        run(connection, statement).await
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement =
            drop_idx("idx_event_ticket_price").to_string(sea_query::SqliteQueryBuilder);
        run(connection, statement).await
    }
}

pub struct CreateIdx4;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateIdx4 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_idx("idx_event_event_date", Event::EventDate)
            .to_string(sea_query::SqliteQueryBuilder);
        run(connection, statement).await
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_idx("idx_event_event_date").to_string(sea_query::SqliteQueryBuilder);
        run(connection, statement).await
    }
}
