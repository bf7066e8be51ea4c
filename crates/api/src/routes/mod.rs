//! API route definitions.

use axum::Router;
use stowage_core::storage::ObjectStore;

use crate::AppState;

pub mod health;
pub mod s3;

/// Creates the API router with all routes.
pub fn api_routes<S: ObjectStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .merge(health::routes::<S>())
        .merge(s3::routes::<S>())
}
