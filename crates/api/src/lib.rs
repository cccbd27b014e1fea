//! HTTP API layer for emote-server.
//!
//! - **Endpoints**: emote submission, lookup, legacy export, bulk upload and tags
//! - **Extractors**: acting user and admin guards
//! - **Middleware**: trusted proxy headers carrying the acting user
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, acting_user_middleware};
