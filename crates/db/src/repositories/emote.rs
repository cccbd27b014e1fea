//! Emote repository.

use std::sync::Arc;

use crate::entities::{Emote, emote};
use emotes_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use super::db_error;

/// Emote repository for database operations.
#[derive(Clone)]
pub struct EmoteRepository {
    db: Arc<DatabaseConnection>,
}

impl EmoteRepository {
    /// Create a new emote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an emote by numeric ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<emote::Model>> {
        Emote::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find an emote by canonical name.
    pub async fn find_by_canonical_name(&self, name: &str) -> AppResult<Option<emote::Model>> {
        Emote::find()
            .filter(emote::Column::CanonicalName.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get all emotes ordered by canonical name.
    pub async fn find_all(&self) -> AppResult<Vec<emote::Model>> {
        Emote::find()
            .order_by_asc(emote::Column::CanonicalName)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Insert a new emote. Fails with a conflict if the canonical name is taken.
    pub async fn create(&self, model: emote::ActiveModel) -> AppResult<emote::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Update an emote, writing only the fields that were set.
    pub async fn update(&self, model: emote::ActiveModel) -> AppResult<emote::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_emote(id: i32, canonical_name: &str) -> emote::Model {
        emote::Model {
            id,
            canonical_name: canonical_name.to_string(),
            single_image_extension: "png".to_string(),
            img_animation: false,
            width: Some(70),
            height: Some(70),
            has_hover: false,
            single_hover_image_extension: None,
            hover_animation: false,
            hover_width: None,
            hover_height: None,
            src: None,
            alt_text: None,
            css: None,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_canonical_name() {
        let emote = create_test_emote(1, "mls/volatile/derp");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[emote.clone()]])
                .into_connection(),
        );

        let repo = EmoteRepository::new(db);
        let result = repo
            .find_by_canonical_name("mls/volatile/derp")
            .await
            .unwrap();

        assert_eq!(result.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<emote::Model>::new()])
                .into_connection(),
        );

        let repo = EmoteRepository::new(db);
        let result = repo.find_by_id(42).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_all() {
        let a = create_test_emote(1, "a");
        let b = create_test_emote(2, "b");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a, b]])
                .into_connection(),
        );

        let repo = EmoteRepository::new(db);
        let result = repo.find_all().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].canonical_name, "b");
    }
}
