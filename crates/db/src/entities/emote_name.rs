//! Emote name entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An alias an emote can be looked up by.
///
/// Names are globally unique and bound to at most one emote.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emote_name")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,

    /// Owning emote, if any.
    pub emote_id: Option<i32>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::emote::Entity",
        from = "Column::EmoteId",
        to = "super::emote::Column::Id",
        on_delete = "Cascade"
    )]
    Emote,
}

impl Related<super::emote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Emote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
