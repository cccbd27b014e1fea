//! API endpoints.

mod emotes;
mod tags;

use axum::{Router, middleware};

use crate::middleware::{AppState, acting_user_middleware};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/emotes", emotes::router())
        .nest("/tags", tags::router())
        .layer(middleware::from_fn(acting_user_middleware))
}
