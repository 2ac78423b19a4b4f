//! Vastra Commerce - fashion storefront backend.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vastra_commerce::config::AppConfig;
use vastra_commerce::http::{router, AppState};
use vastra_commerce::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let store = Arc::new(MemoryStore::new());
    let app = router(AppState::new(store, config.pricing));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("vastra-commerce listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
