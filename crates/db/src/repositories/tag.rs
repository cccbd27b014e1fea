//! Tag repository.

use std::sync::Arc;

use crate::entities::{EmoteTag, Tag, emote_tag, tag};
use chrono::Utc;
use emotes_common::{AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::db_error;

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a tag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get or create a tag.
    pub async fn get_or_create(&self, name: &str) -> AppResult<tag::Model> {
        if let Some(tag) = self.find_by_name(name).await? {
            return Ok(tag);
        }

        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
        };

        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// List all tags by name.
    pub async fn find_all(&self) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Tags attached to an emote.
    pub async fn find_by_emote(&self, emote_id: i32) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .inner_join(EmoteTag)
            .filter(emote_tag::Column::EmoteId.eq(emote_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Check whether a tag is attached to an emote.
    pub async fn is_attached(&self, emote_id: i32, tag_id: &str) -> AppResult<bool> {
        let count = EmoteTag::find()
            .filter(emote_tag::Column::EmoteId.eq(emote_id))
            .filter(emote_tag::Column::TagId.eq(tag_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count > 0)
    }

    /// Attach a tag to an emote. Attaching twice is a no-op.
    pub async fn attach(&self, emote_id: i32, tag_id: &str) -> AppResult<()> {
        if self.is_attached(emote_id, tag_id).await? {
            return Ok(());
        }

        let model = emote_tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            emote_id: Set(emote_id),
            tag_id: Set(tag_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        model.insert(self.db.as_ref()).await.map_err(db_error)?;
        Ok(())
    }

    /// Detach a tag from an emote. The tag row itself is kept.
    pub async fn detach(&self, emote_id: i32, tag_id: &str) -> AppResult<()> {
        EmoteTag::delete_many()
            .filter(emote_tag::Column::EmoteId.eq(emote_id))
            .filter(emote_tag::Column::TagId.eq(tag_id))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_tag(id: &str, name: &str) -> tag::Model {
        tag::Model {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_or_create_existing() {
        let tag = create_test_tag("t1", "pony");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[tag.clone()]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.get_or_create("pony").await.unwrap();

        assert_eq!(result.id, "t1");
    }

    #[tokio::test]
    async fn test_get_or_create_new() {
        let created = create_test_tag("t2", "happy");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<tag::Model>::new()])
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.get_or_create("happy").await.unwrap();

        assert_eq!(result.name, "happy");
    }

    #[tokio::test]
    async fn test_find_by_emote() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_tag("t1", "a"), create_test_tag("t2", "b")]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo.find_by_emote(1).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_detach() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        repo.detach(1, "t1").await.unwrap();
    }
}
