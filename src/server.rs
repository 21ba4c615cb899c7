use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use eventhub_event::{BlobStore, Broadcaster, LocalBlobStore};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use sqlx_migrator::{Migrate, Plan};
use tokio::{net::TcpListener, signal};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};
use tracing::info;

use crate::{
    auth::{AuthService, JwtAuthService},
    config::{Config, DatabaseConfig},
    routes,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: eventhub_shared::State,
    pub auth: Arc<dyn AuthService>,
    pub blobs: Arc<dyn BlobStore>,
    pub broadcaster: Broadcaster,
    pub user_command: Arc<eventhub_user::Command>,
    pub user_query: Arc<eventhub_user::Query>,
    pub event_command: Arc<eventhub_event::Command>,
    pub event_query: Arc<eventhub_event::Query>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: eventhub_shared::State,
        auth: Arc<dyn AuthService>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let broadcaster = Broadcaster::default();

        Self {
            user_command: Arc::new(eventhub_user::Command::new(db.clone())),
            user_query: Arc::new(eventhub_user::Query::new(db.clone())),
            event_command: Arc::new(eventhub_event::Command::new(
                db.clone(),
                blobs.clone(),
                broadcaster.clone(),
            )),
            event_query: Arc::new(eventhub_event::Query::new(db.clone())),
            config,
            db,
            auth,
            blobs,
            broadcaster,
        }
    }
}

/// Opens the read pool and the single-connection write pool.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<eventhub_shared::State> {
    let opts = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let read_db = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts.clone())
        .await?;

    let write_db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await?;

    Ok(eventhub_shared::State { read_db, write_db })
}

#[tracing::instrument(skip_all)]
pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    let mut conn = pool.acquire().await?;
    eventhub_db::migrator::<sqlx::Sqlite>()?
        .run(&mut *conn, &Plan::apply_all())
        .await?;

    info!("Migrations completed successfully");

    Ok(())
}

/// Create the application router
pub fn router(state: AppState) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(&state.config.server.frontend_url)
        .with_context(|| format!("invalid frontend_url {}", state.config.server.frontend_url))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api = Router::new()
        .route(
            "/event",
            get(routes::event::list).post(routes::event::create),
        )
        .route(
            "/event/{id}",
            get(routes::event::detail).delete(routes::event::delete),
        )
        .route("/event/{id}/like", post(routes::event::like))
        .route("/event/{id}/participate", post(routes::event::participate))
        .route("/user/signup", post(routes::user::signup))
        .route("/user/login", post(routes::user::login))
        .route("/user/profile", get(routes::user::profile))
        .route("/user/logout", post(routes::user::logout))
        .route(
            "/upload/image",
            post(routes::upload::image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        );

    let media = ServeDir::new(&state.config.blob.dir);

    Ok(Router::new()
        .nest("/api/v1", api)
        .route("/health", get(routes::health::health))
        .route("/ready", get(routes::health::ready))
        .route("/ws", get(routes::ws::handler))
        .nest_service("/media", media)
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new().br(true).gzip(true))
        .layer(TraceLayer::new_for_http()))
}

/// Start the web server
pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Initializing database...");

    let db = connect(&config.database).await?;
    migrate(&db.write_db).await?;

    let auth = Arc::new(JwtAuthService::new(&config.jwt));
    let blobs =
        Arc::new(LocalBlobStore::new(&config.blob.dir, &config.blob.public_base_url).await?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = router(AppState::new(config, db, auth, blobs))?;

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                tracing::error!(err = %err, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                tracing::error!(err = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
