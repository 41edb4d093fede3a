//! bloom-gateway server entry point.
//!
//! Runs migrations, wires the services, and starts the Axum HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bloom_gateway::api;
use bloom_gateway::app_state::AppState;
use bloom_gateway::config::BookingConfig;
use bloom_gateway::persistence::postgres::PostgresStore;
use bloom_gateway::persistence::Store;
use bloom_gateway::provider::stripe::StripeProvider;
use bloom_gateway::service::{
    BookingService, LogDispatcher, LoyaltyService, PaymentService, ReminderService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = BookingConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting bloom-gateway");

    // Connect and migrate
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    // Build persistence and provider layers
    let store: Arc<dyn Store> = Arc::new(PostgresStore::new(pool));
    let provider = config.stripe.as_ref().map(|stripe| {
        Arc::new(StripeProvider::new(stripe)) as Arc<dyn bloom_gateway::provider::PaymentProvider>
    });
    if provider.is_none() {
        tracing::warn!("no payment provider configured; card intents will be rejected");
    }

    // Build service layer
    let loyalty = LoyaltyService::new(Arc::clone(&store));
    let bookings = Arc::new(BookingService::new(Arc::clone(&store)));
    let payments = Arc::new(PaymentService::new(
        Arc::clone(&store),
        loyalty.clone(),
        provider,
    ));
    let reminders = Arc::new(ReminderService::new(
        Arc::clone(&store),
        Arc::new(LogDispatcher),
    ));

    // Build application state
    let app_state = AppState {
        bookings,
        payments,
        loyalty: Arc::new(loyalty),
        reminders,
        store,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
