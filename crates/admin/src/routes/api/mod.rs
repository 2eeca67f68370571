//! JSON API route handlers for admin.

pub mod stores;
pub mod timestamps;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(stores::router())
        .merge(timestamps::router())
}
