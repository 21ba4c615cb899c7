use std::str::FromStr;

use eventhub_db::table::Event;
use futures::{SinkExt, StreamExt, stream::BoxStream};
use sea_query::{Expr, ExprTrait, Order, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::{Deserialize, Serialize};
use sqlx::{
    prelude::FromRow,
    types::{Json, Text},
};
use ulid::Ulid;

use crate::{Category, EventDate, EventTime, MemberSet};

const STREAM_BUFFER: usize = 32;

pub type EventStream = BoxStream<'static, eventhub_shared::Result<EventSummary>>;

/// Conditions for listing events. Every condition present must hold. An
/// event matches `categories` when its category is any of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub categories: Vec<Category>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub start_date: Option<EventDate>,
    pub end_date: Option<EventDate>,
    pub start_time: Option<EventTime>,
    pub end_time: Option<EventTime>,
}

impl EventFilter {
    pub fn validate(&self) -> eventhub_shared::Result<()> {
        for price in [self.min_price, self.max_price].into_iter().flatten() {
            if !price.is_finite() {
                eventhub_shared::user!("Invalid price filter");
            }
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                eventhub_shared::user!("minPrice must not be greater than maxPrice");
            }
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                eventhub_shared::user!("startDate must not be after endDate");
            }
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                eventhub_shared::user!("startTime must not be after endTime");
            }
        }

        Ok(())
    }

    fn apply(&self, statement: &mut SelectStatement) {
        if !self.categories.is_empty() {
            statement.and_where(
                Expr::col(Event::Category).is_in(self.categories.iter().map(|c| c.to_string())),
            );
        }

        if let Some(min) = self.min_price {
            statement.and_where(Expr::col(Event::TicketPrice).gte(min));
        }

        if let Some(max) = self.max_price {
            statement.and_where(Expr::col(Event::TicketPrice).lte(max));
        }

        if let Some(start) = self.start_date {
            statement.and_where(Expr::col(Event::EventDate).gte(start.to_string()));
        }

        if let Some(end) = self.end_date {
            statement.and_where(Expr::col(Event::EventDate).lte(end.to_string()));
        }

        if let Some(start) = self.start_time {
            statement.and_where(Expr::col(Event::EventTime).gte(start.to_string()));
        }

        if let Some(end) = self.end_time {
            statement.and_where(Expr::col(Event::EventTime).lte(end.to_string()));
        }
    }
}

/// Raw list query string. `category` may be repeated or comma-joined, empty
/// values are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub category: Vec<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

fn parse_opt<T: FromStr>(
    value: Option<String>,
    name: &str,
) -> eventhub_shared::Result<Option<T>> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };

    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => eventhub_shared::user!("Invalid {}: {}", name, value),
    }
}

impl TryFrom<ListParams> for EventFilter {
    type Error = eventhub_shared::Error;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let mut categories = Vec::new();
        for name in params.category.iter().flat_map(|v| v.split(',')) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let Ok(category) = Category::from_str(name) else {
                eventhub_shared::user!("Invalid category: {}", name);
            };

            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        let filter = Self {
            categories,
            min_price: parse_opt(params.min_price, "minPrice")?,
            max_price: parse_opt(params.max_price, "maxPrice")?,
            start_date: parse_opt(params.start_date, "startDate")?,
            end_date: parse_opt(params.end_date, "endDate")?,
            start_time: parse_opt(params.start_time, "startTime")?,
            end_time: parse_opt(params.end_time, "endTime")?,
        };

        filter.validate()?;

        Ok(filter)
    }
}

/// List view of an event. Never carries the like roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: Ulid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub likes: i64,
    pub participants: MemberSet,
    pub category: Category,
    pub ticket_price: f64,
    pub event_date: EventDate,
    pub event_time: EventTime,
    pub location: String,
    pub organized_by: String,
}

#[derive(FromRow)]
struct EventSummaryRow {
    id: Text<Ulid>,
    title: String,
    description: String,
    image: Option<String>,
    likes: i64,
    participants: Json<MemberSet>,
    category: Text<Category>,
    ticket_price: f64,
    event_date: Text<EventDate>,
    event_time: Text<EventTime>,
    location: String,
    organized_by: String,
}

impl From<EventSummaryRow> for EventSummary {
    fn from(row: EventSummaryRow) -> Self {
        Self {
            id: row.id.0,
            title: row.title,
            description: row.description,
            image: row.image,
            likes: row.likes,
            participants: row.participants.0,
            category: row.category.0,
            ticket_price: row.ticket_price,
            event_date: row.event_date.0,
            event_time: row.event_time.0,
            location: row.location,
            organized_by: row.organized_by,
        }
    }
}

impl super::Query {
    /// Streams the events matching `filter`, newest first. Rows are fetched
    /// in the background as the stream is consumed; dropping the stream stops
    /// the fetch.
    pub async fn list(&self, filter: EventFilter) -> eventhub_shared::Result<EventStream> {
        filter.validate()?;

        let mut statement = sea_query::Query::select()
            .columns([
                Event::Id,
                Event::Title,
                Event::Description,
                Event::Image,
                Event::Likes,
                Event::Participants,
                Event::Category,
                Event::TicketPrice,
                Event::EventDate,
                Event::EventTime,
                Event::Location,
                Event::OrganizedBy,
            ])
            .from(Event::Table)
            .order_by(Event::Id, Order::Desc)
            .to_owned();

        filter.apply(&mut statement);

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let pool = self.read_db.clone();
        let (mut sender, receiver) = futures::channel::mpsc::channel(STREAM_BUFFER);

        tokio::spawn(async move {
            let mut rows =
                sqlx::query_as_with::<_, EventSummaryRow, _>(&sql, values).fetch(&pool);

            while let Some(row) = rows.next().await {
                let item = row
                    .map(EventSummary::from)
                    .map_err(eventhub_shared::Error::from);
                let failed = item.is_err();

                if sender.send(item).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(receiver.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(category: &[&str]) -> ListParams {
        ListParams {
            category: category.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_categories_comma_joined_or_repeated() {
        let filter = EventFilter::try_from(params(&["Concert,Meetup"])).unwrap();
        assert_eq!(filter.categories, vec![Category::Concert, Category::Meetup]);

        let filter =
            EventFilter::try_from(params(&["Concert", "Trade Show", "Concert"])).unwrap();
        assert_eq!(
            filter.categories,
            vec![Category::Concert, Category::TradeShow]
        );

        let filter = EventFilter::try_from(params(&[""])).unwrap();
        assert!(filter.categories.is_empty());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(matches!(
            EventFilter::try_from(params(&["Concert,Picnic"])),
            Err(eventhub_shared::Error::User(_))
        ));
    }

    #[test]
    fn test_ranges() {
        let filter = EventFilter::try_from(ListParams {
            min_price: Some("100".to_owned()),
            max_price: Some("200".to_owned()),
            start_date: Some("2025-01-01".to_owned()),
            end_time: Some("".to_owned()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(filter.min_price, Some(100.0));
        assert_eq!(filter.max_price, Some(200.0));
        assert_eq!(filter.start_date.unwrap().to_string(), "2025-01-01");
        assert_eq!(filter.end_time, None);

        for params in [
            ListParams {
                min_price: Some("300".to_owned()),
                max_price: Some("200".to_owned()),
                ..Default::default()
            },
            ListParams {
                min_price: Some("cheap".to_owned()),
                ..Default::default()
            },
            ListParams {
                start_date: Some("2025-02-01".to_owned()),
                end_date: Some("2025-01-01".to_owned()),
                ..Default::default()
            },
            ListParams {
                start_time: Some("20:00".to_owned()),
                end_time: Some("08:00".to_owned()),
                ..Default::default()
            },
            ListParams {
                max_price: Some("NaN".to_owned()),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                EventFilter::try_from(params),
                Err(eventhub_shared::Error::User(_))
            ));
        }
    }
}
