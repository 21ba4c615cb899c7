use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use eventhub::{
    AppState, Config,
    auth::JwtAuthService,
    config::{BlobConfig, DatabaseConfig, JwtConfig, ObservabilityConfig, ServerConfig},
};
use eventhub_event::LocalBlobStore;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: temp_dir::TempDir,
}

pub async fn create_test_app() -> anyhow::Result<TestApp> {
    let dir = temp_dir::TempDir::new()?;
    let media = dir.child("media");

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            frontend_url: "http://localhost:5173".to_string(),
        },
        database: DatabaseConfig {
            url: format!("sqlite:{}", dir.child("db.sqlite3").to_str().unwrap()),
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_string(),
            issuer: "eventhub".to_string(),
            audience: "eventhub-web".to_string(),
            expiration_hours: 24,
        },
        blob: BlobConfig {
            dir: media.to_str().unwrap().to_string(),
            public_base_url: "http://localhost:3000/media".to_string(),
        },
        observability: ObservabilityConfig::default(),
    };

    let db = eventhub::server::connect(&config.database).await?;
    eventhub::server::migrate(&db.write_db).await?;

    let auth = Arc::new(JwtAuthService::new(&config.jwt));
    let blobs = Arc::new(LocalBlobStore::new(media, &config.blob.public_base_url).await?);
    let state = AppState::new(config, db, auth, blobs);
    let router = eventhub::router(state.clone())?;

    Ok(TestApp { router, state, dir })
}

#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

#[allow(dead_code)]
impl TestResponse {
    /// `name=value` part of the auth cookie set by the response.
    pub fn cookie(&self) -> Option<String> {
        self.set_cookie()
            .and_then(|value| value.split(';').next().map(str::to_owned))
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> anyhow::Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> anyhow::Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        self.send(request).await
    }

    /// Signs a user up and returns its session cookie.
    #[allow(dead_code)]
    pub async fn signup(&self, name: &str) -> anyhow::Result<String> {
        let response = self
            .request(
                Method::POST,
                "/api/v1/user/signup",
                Some(json!({
                    "name": name,
                    "email": format!("{name}@eventhub.localhost"),
                    "password": "my_password",
                })),
                None,
            )
            .await?;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        response
            .cookie()
            .ok_or_else(|| anyhow::anyhow!("signup did not set a cookie"))
    }

    #[allow(dead_code)]
    pub async fn create_event(
        &self,
        cookie: &str,
        title: &str,
        category: &str,
        ticket_price: f64,
    ) -> anyhow::Result<String> {
        let response = self
            .request(
                Method::POST,
                "/api/v1/event",
                Some(event_body(title, category, ticket_price)),
                Some(cookie),
            )
            .await?;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        response.body["id"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("created event has no id"))
    }
}

#[allow(dead_code)]
pub fn event_body(title: &str, category: &str, ticket_price: f64) -> Value {
    json!({
        "title": title,
        "description": format!("{title} description"),
        "organizedBy": "Eventhub",
        "eventDate": "2025-09-12",
        "eventTime": "19:00",
        "location": "Paris",
        "category": category,
        "ticketPrice": ticket_price,
        "quantity": 100,
    })
}
