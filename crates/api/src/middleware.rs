//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use emotes_common::IdGenerator;
use emotes_core::{ActingUser, EmoteService, Role};
use tracing::debug;

/// Header carrying the acting user's id, set by the upstream auth proxy.
pub const USER_HEADER: &str = "x-emote-user";

/// Header carrying the acting user's role (`0` member, `1` admin).
pub const ROLE_HEADER: &str = "x-emote-role";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub emote_service: EmoteService,
    pub id_gen: IdGenerator,
}

impl AppState {
    #[must_use]
    pub const fn new(emote_service: EmoteService) -> Self {
        Self {
            emote_service,
            id_gen: IdGenerator::new(),
        }
    }
}

fn parse_role(value: &str) -> Role {
    let value = value.trim();
    match value.parse::<i32>() {
        Ok(level) => Role::from_level(level),
        Err(_) if value.eq_ignore_ascii_case("admin") => Role::Admin,
        Err(_) => Role::Member,
    }
}

/// Attach the acting user from the trusted proxy headers.
///
/// Requests without a user header pass through anonymously; handlers that
/// need a user reject them.
pub async fn acting_user_middleware(mut req: Request<Body>, next: Next) -> Response {
    let user = req
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| ActingUser {
            id: id.to_string(),
            role: req
                .headers()
                .get(ROLE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map_or(Role::Member, parse_role),
        });

    if let Some(user) = user {
        debug!(user_id = %user.id, role = ?user.role, "Acting user");
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
