//! Emote name repository.

use std::sync::Arc;

use crate::entities::{EmoteName, emote_name};
use chrono::Utc;
use emotes_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use super::db_error;

/// Emote name repository for database operations.
#[derive(Clone)]
pub struct EmoteNameRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl EmoteNameRepository {
    /// Create a new emote name repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a name row by its string.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<emote_name::Model>> {
        EmoteName::find()
            .filter(emote_name::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get or create an unbound name row.
    pub async fn get_or_create(&self, name: &str) -> AppResult<emote_name::Model> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing);
        }

        let model = emote_name::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            emote_id: Set(None),
            created_at: Set(Utc::now().into()),
        };

        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Names owned by an emote.
    pub async fn find_by_emote(&self, emote_id: i32) -> AppResult<Vec<emote_name::Model>> {
        EmoteName::find()
            .filter(emote_name::Column::EmoteId.eq(emote_id))
            .order_by_asc(emote_name::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Bind an unbound name to an emote.
    ///
    /// Names already owned by an emote are never reassigned; that case is a
    /// conflict.
    pub async fn attach(&self, emote_id: i32, name_id: &str) -> AppResult<()> {
        let result = EmoteName::update_many()
            .col_expr(emote_name::Column::EmoteId, Expr::value(emote_id))
            .filter(emote_name::Column::Id.eq(name_id))
            .filter(emote_name::Column::EmoteId.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "Name {name_id} is already bound to an emote"
            )));
        }

        Ok(())
    }

    /// Delete a name row.
    pub async fn delete(&self, name_id: &str) -> AppResult<()> {
        EmoteName::delete_by_id(name_id)
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

    fn create_test_name(id: &str, name: &str, emote_id: Option<i32>) -> emote_name::Model {
        emote_name::Model {
            id: id.to_string(),
            name: name.to_string(),
            emote_id,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_emote() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_name("n1", "derp", Some(1)),
                    create_test_name("n2", "derpy", Some(1)),
                ]])
                .into_connection(),
        );

        let repo = EmoteNameRepository::new(db);
        let result = repo.find_by_emote(1).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_attach_unbound() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = EmoteNameRepository::new(db);
        repo.attach(1, "n1").await.unwrap();
    }

    #[tokio::test]
    async fn test_attach_bound_name_conflicts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = EmoteNameRepository::new(db);
        let result = repo.attach(1, "n1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
