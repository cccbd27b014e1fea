//! Tag entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A label shared between emotes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::emote_tag::Entity")]
    EmoteTags,
}

impl Related<super::emote_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmoteTags.def()
    }
}

impl Related<super::emote::Entity> for Entity {
    fn to() -> RelationDef {
        super::emote_tag::Relation::Emote.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::emote_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
