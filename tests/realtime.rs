mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn join(client: &mut Client, event_id: &str) -> anyhow::Result<()> {
    client
        .send(Message::text(
            json!({"type": "joinEvent", "eventId": event_id}).to_string(),
        ))
        .await?;

    Ok(())
}

async fn next_notification(client: &mut Client) -> anyhow::Result<Value> {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("socket closed"))??;

        if message.is_text() {
            return Ok(serde_json::from_str(message.to_text()?)?);
        }
    }
}

async fn wait_for_topics(app: &common::TestApp, count: usize) -> anyhow::Result<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.broadcaster.topic_count() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    Ok(())
}

#[tokio::test]
async fn test_toggles_reach_only_the_event_room() -> anyhow::Result<()> {
    let app = common::create_test_app().await?;
    let john = app.signup("john").await?;
    let albert = app.signup("albert").await?;
    let e1 = app.create_event(&john, "Jazz Night", "Concert", 20.0).await?;
    let e2 = app.create_event(&john, "Rust Meetup", "Meetup", 0.0).await?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(axum::serve(listener, app.router.clone()).into_future());

    let (mut room_1, _) = connect_async(format!("ws://{addr}/ws")).await?;
    let (mut room_2, _) = connect_async(format!("ws://{addr}/ws")).await?;

    join(&mut room_1, &e1).await?;
    join(&mut room_2, &e2).await?;
    wait_for_topics(&app, 2).await?;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/event/{e1}/participate"),
            None,
            Some(&albert),
        )
        .await?;
    assert_eq!(response.status, StatusCode::OK);

    let notification = next_notification(&mut room_1).await?;
    assert_eq!(
        notification,
        json!({"type": "participantUpdate", "eventId": e1, "participantCount": 1})
    );

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/event/{e1}/like"),
            None,
            Some(&john),
        )
        .await?;
    assert_eq!(response.status, StatusCode::OK);

    let notification = next_notification(&mut room_1).await?;
    assert_eq!(
        notification,
        json!({"type": "likeUpdate", "eventId": e1, "likesCount": 1})
    );

    let silent = tokio::time::timeout(Duration::from_millis(200), room_2.next()).await;
    assert!(silent.is_err(), "other room received {silent:?}");

    room_1.close(None).await?;
    room_2.close(None).await?;
    server.abort();

    Ok(())
}

#[tokio::test]
async fn test_leave_stops_notifications() -> anyhow::Result<()> {
    let app = common::create_test_app().await?;
    let john = app.signup("john").await?;
    let e1 = app.create_event(&john, "Jazz Night", "Concert", 20.0).await?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(axum::serve(listener, app.router.clone()).into_future());

    let (mut client, _) = connect_async(format!("ws://{addr}/ws")).await?;
    join(&mut client, &e1).await?;
    wait_for_topics(&app, 1).await?;

    client
        .send(Message::text(
            json!({"type": "leaveEvent", "eventId": e1}).to_string(),
        ))
        .await?;
    client
        .send(Message::text(json!({"type": "unknown"}).to_string()))
        .await?;

    tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.broadcaster.subscriber_count(&e1) > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    app.request(
        Method::POST,
        &format!("/api/v1/event/{e1}/like"),
        None,
        Some(&john),
    )
    .await?;

    let silent = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(silent.is_err(), "left room received {silent:?}");

    server.abort();

    Ok(())
}

#[tokio::test]
async fn test_join_accepts_any_case_event_id() -> anyhow::Result<()> {
    let app = common::create_test_app().await?;
    let john = app.signup("john").await?;
    let e1 = app.create_event(&john, "Jazz Night", "Concert", 20.0).await?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(axum::serve(listener, app.router.clone()).into_future());

    let (mut client, _) = connect_async(format!("ws://{addr}/ws")).await?;
    join(&mut client, "not-an-event").await?;
    join(&mut client, &e1.to_lowercase()).await?;
    wait_for_topics(&app, 1).await?;
    assert_eq!(app.state.broadcaster.subscriber_count(&e1), 1);

    app.request(
        Method::POST,
        &format!("/api/v1/event/{e1}/like"),
        None,
        Some(&john),
    )
    .await?;

    let notification = next_notification(&mut client).await?;
    assert_eq!(
        notification,
        json!({"type": "likeUpdate", "eventId": e1, "likesCount": 1})
    );
    assert_eq!(app.state.broadcaster.topic_count(), 1);

    server.abort();

    Ok(())
}
