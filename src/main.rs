use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tutor_desk::api::router;
use tutor_desk::config::Config;
use tutor_desk::db;
use tutor_desk::events::ChangeFeed;
use tutor_desk::settings::FileSettings;
use tutor_desk::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tutor_desk=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new_from_env()?;
    let pool = db::connect(&config.database_url).await?;
    let settings = FileSettings::open(&config.settings_path).await?;
    let feed = ChangeFeed::new();

    let state = AppState {
        db: pool,
        feed,
        config: config.clone(),
        settings: Arc::new(settings),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
