use anyhow::Result;
use axum::{
    extract::Extension,
    routing::{delete, get, post, put},
    Router,
};
use redis::aio::ConnectionManager;
use sea_orm::{Database, DatabaseConnection};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::NOTICE_CHANNEL_CAPACITY;
use crate::handlers;
use crate::sweep::{self, Notice};

pub(crate) struct State {
    pub(crate) db: DatabaseConnection,
    pub(crate) redis_manager: ConnectionManager,
    pub(crate) notifier: broadcast::Sender<Notice>,
}

impl State {
    /// Attempt to create a new State instance
    pub(crate) async fn try_new() -> Result<State> {
        let db = Database::connect(std::env::var("DATABASE_URL")?).await?;
        let redis_client = redis::Client::open(std::env::var("REDIS_URL")?)?;
        let redis_manager = redis_client.get_tokio_connection_manager().await?;
        let (notifier, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        Ok(State {
            db,
            redis_manager,
            notifier,
        })
    }
}

/// Run the server.
pub(crate) async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chivvy_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = Arc::new(State::try_new().await?);

    // the reminder sweep runs for the lifetime of the process
    tokio::spawn(sweep::run(Arc::clone(&state)));

    let app = Router::new()
        .route("/", get(|| async { "API is running..." }))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", delete(handlers::logout))
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/:id",
            put(handlers::edit_task).delete(handlers::delete_task),
        )
        .route("/api/tasks/:id/complete", put(handlers::toggle_task_complete))
        .route("/ws", get(handlers::realtime))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(Extension(state)),
        );

    let addr: SocketAddr = std::env::var("ADDR")?.parse()?;
    tracing::info!("listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
