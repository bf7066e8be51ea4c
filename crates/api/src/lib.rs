//! HTTP API layer with Axum routes.
//!
//! This crate maps the REST surface onto the storage facade:
//! bucket management, staged upload/download, and presigned URLs.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use stowage_core::storage::{ObjectStore, StorageFacade};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
///
/// Generic over the object store so router tests run against an
/// in-memory store instead of a live endpoint.
pub struct AppState<S: ObjectStore> {
    /// Storage facade owning validation and the staging directory.
    pub facade: Arc<StorageFacade<S>>,
}

impl<S: ObjectStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            facade: Arc::clone(&self.facade),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: ObjectStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .merge(routes::api_routes::<S>())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
