/**
 * Server Initialization
 *
 * This module turns a loaded `ServerConfig` into a ready-to-serve router.
 *
 * # Initialization Process
 *
 * 1. Open the store (`load_store`: PostgreSQL with migrations, or memory)
 * 2. Wire the services into `AppState`
 * 3. Make sure the upload directory exists
 * 4. Create the router with all routes and layers
 *
 * Unlike the store, nothing here is optional: a store that cannot be opened
 * or an upload directory that cannot be created aborts startup.
 */

use axum::Router;
use thiserror::Error;

use crate::backend::media::MediaError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, ServerConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to prepare upload directory: {0}")]
    Media(#[from] MediaError),
}

/// Open the store and build the application state
pub async fn init_state(config: ServerConfig) -> Result<AppState, InitError> {
    let store = load_store(&config).await?;
    let state = AppState::new(config, store);

    state.media.ensure_root().await?;
    tracing::info!("Serving uploads from {}", state.media.root().display());

    Ok(state)
}

/// Create the Axum application for already-built state
pub fn create_app(state: AppState) -> Router<()> {
    tracing::info!("Initializing GoGo backend server");
    let app = create_router(state);
    tracing::info!("Router configured");
    app
}
