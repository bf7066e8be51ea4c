//! Stowage API Server
//!
//! Main entry point for the Stowage object-storage facade.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stowage_api::{AppState, create_router};
use stowage_core::storage::{S3Client, StorageConfig, StorageFacade};
use stowage_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stowage=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Build the storage client once; handlers close over it via state
    let storage_config = StorageConfig::new(
        config.storage.access_key.clone(),
        config.storage.secret_key.clone(),
        config.storage.region.clone(),
        config.storage.staging_dir.clone(),
    )
    .with_endpoint(config.storage.endpoint.clone())
    .with_path_style(config.storage.force_path_style);

    // The staging directory must exist and be writable before any
    // upload is served
    tokio::fs::create_dir_all(&storage_config.staging_dir).await?;
    info!(
        staging_dir = %storage_config.staging_dir.display(),
        endpoint = %storage_config.endpoint,
        region = %storage_config.region,
        "Storage configured"
    );

    let client = S3Client::from_config(&storage_config);
    let facade = StorageFacade::new(Arc::new(client), storage_config.staging_dir.clone());

    // Create application state
    let state = AppState {
        facade: Arc::new(facade),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
