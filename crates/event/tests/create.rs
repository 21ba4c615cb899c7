mod helpers;

use eventhub_event::{Category, CreateEventInput, Query};
use eventhub_shared::Error;
use ulid::Ulid;

#[tokio::test]
async fn test_create() -> anyhow::Result<()> {
    let dir = temp_dir::TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, _) = helpers::setup_command(&state, &dir).await?;
    let john = helpers::create_user(&state, "john").await?;

    let event = helpers::create_event(&cmd, john, "Jazz Night", Category::Concert, 25.0).await?;
    assert_eq!(event.owner, john);
    assert_eq!(event.likes, 0);
    assert!(event.liked_by.is_empty());
    assert!(event.participants.is_empty());
    assert_eq!(event.booking_count, 0);

    let stored = Query::new(state.clone()).load(event.id).await?.unwrap();
    assert_eq!(stored, event);

    let user = eventhub_user::Query::new(state.clone())
        .find(john.to_string())
        .await?
        .unwrap();
    assert_eq!(user.events, vec![event.id]);

    let second = helpers::create_event(&cmd, john, "Rust Meetup", Category::Meetup, 0.0).await?;
    let user = eventhub_user::Query::new(state)
        .find(john.to_string())
        .await?
        .unwrap();
    assert_eq!(user.events, vec![event.id, second.id]);

    Ok(())
}

#[tokio::test]
async fn test_create_validation() -> anyhow::Result<()> {
    let dir = temp_dir::TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let (cmd, _) = helpers::setup_command(&state, &dir).await?;
    let john = helpers::create_user(&state, "john").await?;

    let mut input = helpers::input("", Category::Workshop, 10.0);
    assert!(matches!(
        cmd.create(john, input.clone()).await,
        Err(Error::Validate(_))
    ));

    input.title = "Woodworking".to_owned();
    input.ticket_price = -1.0;
    assert!(matches!(
        cmd.create(john, input.clone()).await,
        Err(Error::Validate(_))
    ));

    input.ticket_price = 10.0;
    assert!(matches!(
        cmd.create(Ulid::new(), input).await,
        Err(Error::NotFound(_))
    ));

    Ok(())
}

#[test]
fn test_create_input_requires_known_category() {
    let mut body = serde_json::json!({
        "title": "Summer Fest",
        "description": "Open air",
        "organizedBy": "City",
        "eventDate": "2025-07-01",
        "eventTime": "16:00",
        "location": "Nantes",
        "category": "Trade Show",
        "ticketPrice": 15.5,
    });

    let input: CreateEventInput = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(input.category, Category::TradeShow);
    assert_eq!(input.quantity, 0);
    assert_eq!(input.image, None);

    body["category"] = "Picnic".into();
    assert!(serde_json::from_value::<CreateEventInput>(body.clone()).is_err());

    body["category"] = "Festival".into();
    body.as_object_mut().unwrap().remove("title");
    assert!(serde_json::from_value::<CreateEventInput>(body).is_err());
}
