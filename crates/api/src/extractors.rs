//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use emotes_common::AppError;
use emotes_core::ActingUser;

/// Acting user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub ActingUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the acting user middleware
        parts
            .extensions
            .get::<ActingUser>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Acting user that must be an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub ActingUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(user))
    }
}
