//! Create tag and emote_tag tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tag::Name)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Tag::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmoteTag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmoteTag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmoteTag::EmoteId).integer().not_null())
                    .col(ColumnDef::new(EmoteTag::TagId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(EmoteTag::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emote_tag_emote")
                            .from(EmoteTag::Table, EmoteTag::EmoteId)
                            .to(Emote::Table, Emote::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emote_tag_tag")
                            .from(EmoteTag::Table, EmoteTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (emote_id, tag_id) - attaching twice is a no-op
        manager
            .create_index(
                Index::create()
                    .name("idx_emote_tag_emote_tag")
                    .table(EmoteTag::Table)
                    .col(EmoteTag::EmoteId)
                    .col(EmoteTag::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: tag_id (for listing emotes by tag)
        manager
            .create_index(
                Index::create()
                    .name("idx_emote_tag_tag_id")
                    .table(EmoteTag::Table)
                    .col(EmoteTag::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmoteTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Emote {
    Table,
    Id,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum EmoteTag {
    Table,
    Id,
    EmoteId,
    TagId,
    CreatedAt,
}
