//! mesa — restaurant table reservation service
//!
//! Long-running service that:
//! - Serves the filtered availability search and restaurant listing
//! - Books and cancels reservations as single atomic transactions
//! - Applies schema migrations on startup

use mesa::api;
use mesa::config::Config;
use mesa::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mesa=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting mesa (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("mesa listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
