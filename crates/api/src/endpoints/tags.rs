//! Tag endpoints.

use axum::{Router, extract::State, routing::get};
use emotes_common::AppResult;
use emotes_db::entities::tag;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Create tag router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_tags))
}

/// Tag response.
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

/// List all tags.
async fn list_tags(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<TagResponse>>> {
    let tags = state.emote_service.list_tags().await?;
    Ok(ApiResponse::ok(tags.into_iter().map(TagResponse::from).collect()))
}
