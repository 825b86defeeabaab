use rusty_library_borrow::{
    adapters::memory::InMemoryLibrary,
    adapters::postgres::{PostgresBookRepository, PostgresBorrowRepository},
    api::{handlers::AppState, router::create_router},
    application::library::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rusty_library_borrow={},tower_http=debug",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize adapters
    let service_deps = match &config.database.url {
        Some(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");

            tracing::info!("Connected to PostgreSQL, migrations applied");

            ServiceDependencies {
                book_repository: Arc::new(PostgresBookRepository::new(pool.clone())),
                borrow_repository: Arc::new(PostgresBorrowRepository::new(pool)),
            }
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            let library = Arc::new(InMemoryLibrary::new());
            ServiceDependencies {
                book_repository: library.clone(),
                borrow_repository: library,
            }
        }
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
