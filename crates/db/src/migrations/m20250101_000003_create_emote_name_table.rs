//! Create emote_name table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmoteName::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmoteName::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmoteName::Name)
                            .string_len(512)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(EmoteName::EmoteId).integer())
                    .col(
                        ColumnDef::new(EmoteName::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emote_name_emote")
                            .from(EmoteName::Table, EmoteName::EmoteId)
                            .to(Emote::Table, Emote::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_emote_name_emote_id")
                    .table(EmoteName::Table)
                    .col(EmoteName::EmoteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmoteName::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Emote {
    Table,
    Id,
}

#[derive(Iden)]
enum EmoteName {
    Table,
    Id,
    Name,
    EmoteId,
    CreatedAt,
}
