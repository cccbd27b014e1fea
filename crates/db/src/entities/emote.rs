//! Emote entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An uploaded emote image, addressed by its canonical name.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emote")]
pub struct Model {
    /// Numeric emote ID.
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Slash-separated canonical name (e.g., "mls/volatile/derp").
    #[sea_orm(unique)]
    pub canonical_name: String,

    /// Detected format of the base image (e.g., "png").
    pub single_image_extension: String,

    /// Whether the base image is animated. Best-effort.
    pub img_animation: bool,

    /// Base image width in pixels. Null for vector images without intrinsic size.
    pub width: Option<i32>,

    /// Base image height in pixels.
    pub height: Option<i32>,

    /// All hover fields must be ignored when this is false.
    pub has_hover: bool,

    /// Detected format of the hover image.
    pub single_hover_image_extension: Option<String>,

    /// Whether the hover image is animated. Best-effort.
    pub hover_animation: bool,

    /// Hover image width in pixels.
    pub hover_width: Option<i32>,

    /// Hover image height in pixels.
    pub hover_height: Option<i32>,

    /// Where this emote originates from. Always a hyperlink.
    pub src: Option<String>,

    /// Accessibility text.
    pub alt_text: Option<String>,

    /// Extra CSS declarations as an ordered JSON object.
    pub css: Option<Json>,

    /// User that created this emote.
    pub created_by: Option<String>,

    /// User that last updated this emote.
    pub updated_by: Option<String>,

    /// Created at timestamp.
    pub created_at: DateTime<Utc>,

    /// Updated at timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Emote relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::emote_name::Entity")]
    Names,
    #[sea_orm(has_many = "super::emote_tag::Entity")]
    EmoteTags,
}

impl Related<super::emote_name::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Names.def()
    }
}

impl Related<super::emote_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmoteTags.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::emote_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::emote_tag::Relation::Emote.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
