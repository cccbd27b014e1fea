//! Emote store: the persistence contract used by the submission workflow.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use emotes_common::{AppError, AppResult};
use sea_orm::{DatabaseConnection, Set};

use crate::entities::{emote, emote_name, tag};
use crate::repositories::{EmoteNameRepository, EmoteRepository, TagRepository};

/// Format, geometry and animation flag of a stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttributes {
    /// Detected format, used as the file extension.
    pub extension: String,
    /// Width in pixels, if the format has an intrinsic size.
    pub width: Option<i32>,
    /// Height in pixels, if the format has an intrinsic size.
    pub height: Option<i32>,
    /// Best-effort animation flag.
    pub animated: bool,
}

/// Attributes of an emote about to be inserted.
#[derive(Debug, Clone)]
pub struct NewEmote {
    pub canonical_name: String,
    pub image: ImageAttributes,
    pub hover: Option<ImageAttributes>,
    pub src: Option<String>,
    pub alt_text: Option<String>,
    pub css: Option<serde_json::Value>,
    pub created_by: Option<String>,
}

impl NewEmote {
    /// Build the active model for insertion.
    #[must_use]
    pub fn into_active_model(self) -> emote::ActiveModel {
        let hover = self.hover;
        emote::ActiveModel {
            canonical_name: Set(self.canonical_name),
            single_image_extension: Set(self.image.extension),
            img_animation: Set(self.image.animated),
            width: Set(self.image.width),
            height: Set(self.image.height),
            has_hover: Set(hover.is_some()),
            single_hover_image_extension: Set(hover.as_ref().map(|h| h.extension.clone())),
            hover_animation: Set(hover.as_ref().is_some_and(|h| h.animated)),
            hover_width: Set(hover.as_ref().and_then(|h| h.width)),
            hover_height: Set(hover.as_ref().and_then(|h| h.height)),
            src: Set(self.src),
            alt_text: Set(self.alt_text),
            css: Set(self.css),
            updated_by: Set(self.created_by.clone()),
            created_by: Set(self.created_by),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
    }
}

/// What to do with the hover image on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverChange {
    /// Replace the hover image.
    Set(ImageAttributes),
    /// Drop the hover image; the file on disk is left alone.
    Remove,
}

/// Fields to overwrite on update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct EmotePatch {
    pub image: Option<ImageAttributes>,
    pub hover: Option<HoverChange>,
    pub src: Option<String>,
    pub alt_text: Option<String>,
    pub css: Option<serde_json::Value>,
    pub updated_by: Option<String>,
}

impl EmotePatch {
    /// Apply the supplied fields to an active model.
    pub fn apply(self, model: &mut emote::ActiveModel) {
        if let Some(image) = self.image {
            model.single_image_extension = Set(image.extension);
            model.img_animation = Set(image.animated);
            model.width = Set(image.width);
            model.height = Set(image.height);
        }

        match self.hover {
            Some(HoverChange::Set(hover)) => {
                model.has_hover = Set(true);
                model.single_hover_image_extension = Set(Some(hover.extension));
                model.hover_animation = Set(hover.animated);
                model.hover_width = Set(hover.width);
                model.hover_height = Set(hover.height);
            }
            Some(HoverChange::Remove) => {
                model.has_hover = Set(false);
                model.single_hover_image_extension = Set(None);
                model.hover_animation = Set(false);
                model.hover_width = Set(None);
                model.hover_height = Set(None);
            }
            None => {}
        }

        if let Some(src) = self.src {
            model.src = Set(Some(src));
        }
        if let Some(alt_text) = self.alt_text {
            model.alt_text = Set(Some(alt_text));
        }
        if let Some(css) = self.css {
            model.css = Set(Some(css));
        }
        if let Some(user) = self.updated_by {
            model.updated_by = Set(Some(user));
        }

        model.updated_at = Set(Some(Utc::now()));
    }
}

/// Persistence API consumed by the emote submission workflow.
#[async_trait]
pub trait EmoteStore: Send + Sync {
    async fn find_by_canonical_name(&self, name: &str) -> AppResult<Option<emote::Model>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<emote::Model>>;

    async fn list_all(&self) -> AppResult<Vec<emote::Model>>;

    /// Insert an emote. A taken canonical name is reported as [`AppError::Conflict`].
    async fn create(&self, emote: NewEmote) -> AppResult<emote::Model>;

    /// Overwrite the supplied fields of an existing emote.
    async fn update(&self, canonical_name: &str, patch: EmotePatch) -> AppResult<emote::Model>;

    async fn list_tags(&self) -> AppResult<Vec<tag::Model>>;

    async fn tags_of(&self, emote_id: i32) -> AppResult<Vec<tag::Model>>;

    async fn find_or_create_tag(&self, name: &str) -> AppResult<tag::Model>;

    async fn attach_tag(&self, emote_id: i32, tag_id: &str) -> AppResult<()>;

    async fn detach_tag(&self, emote_id: i32, tag_id: &str) -> AppResult<()>;

    async fn names_of(&self, emote_id: i32) -> AppResult<Vec<emote_name::Model>>;

    async fn find_or_create_name(&self, name: &str) -> AppResult<emote_name::Model>;

    /// Bind an unbound name. Names owned by any emote are never reassigned.
    async fn attach_name(&self, emote_id: i32, name_id: &str) -> AppResult<()>;

    async fn delete_name(&self, name_id: &str) -> AppResult<()>;
}

/// [`EmoteStore`] backed by the database repositories.
#[derive(Clone)]
pub struct DbEmoteStore {
    emotes: EmoteRepository,
    tags: TagRepository,
    names: EmoteNameRepository,
}

impl DbEmoteStore {
    /// Create a store sharing one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            emotes: EmoteRepository::new(Arc::clone(&db)),
            tags: TagRepository::new(Arc::clone(&db)),
            names: EmoteNameRepository::new(db),
        }
    }
}

#[async_trait]
impl EmoteStore for DbEmoteStore {
    async fn find_by_canonical_name(&self, name: &str) -> AppResult<Option<emote::Model>> {
        self.emotes.find_by_canonical_name(name).await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<emote::Model>> {
        self.emotes.find_by_id(id).await
    }

    async fn list_all(&self) -> AppResult<Vec<emote::Model>> {
        self.emotes.find_all().await
    }

    async fn create(&self, emote: NewEmote) -> AppResult<emote::Model> {
        self.emotes.create(emote.into_active_model()).await
    }

    async fn update(&self, canonical_name: &str, patch: EmotePatch) -> AppResult<emote::Model> {
        let existing = self
            .emotes
            .find_by_canonical_name(canonical_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Emote not found: {canonical_name}")))?;

        let mut model: emote::ActiveModel = existing.into();
        patch.apply(&mut model);

        self.emotes.update(model).await
    }

    async fn list_tags(&self) -> AppResult<Vec<tag::Model>> {
        self.tags.find_all().await
    }

    async fn tags_of(&self, emote_id: i32) -> AppResult<Vec<tag::Model>> {
        self.tags.find_by_emote(emote_id).await
    }

    async fn find_or_create_tag(&self, name: &str) -> AppResult<tag::Model> {
        self.tags.get_or_create(name).await
    }

    async fn attach_tag(&self, emote_id: i32, tag_id: &str) -> AppResult<()> {
        self.tags.attach(emote_id, tag_id).await
    }

    async fn detach_tag(&self, emote_id: i32, tag_id: &str) -> AppResult<()> {
        self.tags.detach(emote_id, tag_id).await
    }

    async fn names_of(&self, emote_id: i32) -> AppResult<Vec<emote_name::Model>> {
        self.names.find_by_emote(emote_id).await
    }

    async fn find_or_create_name(&self, name: &str) -> AppResult<emote_name::Model> {
        self.names.get_or_create(name).await
    }

    async fn attach_name(&self, emote_id: i32, name_id: &str) -> AppResult<()> {
        self.names.attach(emote_id, name_id).await
    }

    async fn delete_name(&self, name_id: &str) -> AppResult<()> {
        self.names.delete(name_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveValue, DatabaseBackend, MockDatabase};

    fn png(width: i32, height: i32) -> ImageAttributes {
        ImageAttributes {
            extension: "png".to_string(),
            width: Some(width),
            height: Some(height),
            animated: false,
        }
    }

    fn stored_emote() -> emote::Model {
        emote::Model {
            id: 7,
            canonical_name: "a/b".to_string(),
            single_image_extension: "png".to_string(),
            img_animation: false,
            width: Some(70),
            height: Some(70),
            has_hover: true,
            single_hover_image_extension: Some("gif".to_string()),
            hover_animation: true,
            hover_width: Some(80),
            hover_height: Some(80),
            src: Some("https://example.com".to_string()),
            alt_text: None,
            css: None,
            created_by: Some("u1".to_string()),
            updated_by: Some("u1".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_new_emote_without_hover() {
        let model = NewEmote {
            canonical_name: "a/b".to_string(),
            image: png(70, 50),
            hover: None,
            src: None,
            alt_text: None,
            css: None,
            created_by: Some("u1".to_string()),
        }
        .into_active_model();

        assert_eq!(model.has_hover, ActiveValue::Set(false));
        assert_eq!(model.hover_width, ActiveValue::Set(None));
        assert_eq!(model.width, ActiveValue::Set(Some(70)));
        assert_eq!(model.updated_by, ActiveValue::Set(Some("u1".to_string())));
    }

    #[test]
    fn test_patch_leaves_unsupplied_fields() {
        let mut model: emote::ActiveModel = stored_emote().into();
        EmotePatch {
            alt_text: Some("Derpy".to_string()),
            ..Default::default()
        }
        .apply(&mut model);

        assert_eq!(model.alt_text, ActiveValue::Set(Some("Derpy".to_string())));
        assert!(!model.width.is_set());
        assert!(!model.src.is_set());
        assert!(!model.has_hover.is_set());
    }

    #[test]
    fn test_patch_remove_hover_clears_group() {
        let mut model: emote::ActiveModel = stored_emote().into();
        EmotePatch {
            hover: Some(HoverChange::Remove),
            ..Default::default()
        }
        .apply(&mut model);

        assert_eq!(model.has_hover, ActiveValue::Set(false));
        assert_eq!(model.single_hover_image_extension, ActiveValue::Set(None));
        assert_eq!(model.hover_width, ActiveValue::Set(None));
        assert_eq!(model.hover_height, ActiveValue::Set(None));
        assert_eq!(model.hover_animation, ActiveValue::Set(false));
    }

    #[tokio::test]
    async fn test_update_missing_emote_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<emote::Model>::new()])
                .into_connection(),
        );

        let store = DbEmoteStore::new(db);
        let result = store.update("missing", EmotePatch::default()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_returns_updated_row() {
        let mut updated = stored_emote();
        updated.width = Some(100);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored_emote()]])
                .append_query_results([[updated]])
                .into_connection(),
        );

        let store = DbEmoteStore::new(db);
        let result = store
            .update(
                "a/b",
                EmotePatch {
                    image: Some(png(100, 70)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(result.width, Some(100));
    }
}
