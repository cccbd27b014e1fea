//! Create emote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Emote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Emote::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Emote::CanonicalName)
                            .string_len(512)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Emote::SingleImageExtension)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Emote::ImgAnimation)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Emote::Width).integer())
                    .col(ColumnDef::new(Emote::Height).integer())
                    .col(
                        ColumnDef::new(Emote::HasHover)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Emote::SingleHoverImageExtension).string_len(16))
                    .col(
                        ColumnDef::new(Emote::HoverAnimation)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Emote::HoverWidth).integer())
                    .col(ColumnDef::new(Emote::HoverHeight).integer())
                    .col(ColumnDef::new(Emote::Src).string_len(2048))
                    .col(ColumnDef::new(Emote::AltText).string_len(1024))
                    .col(ColumnDef::new(Emote::Css).json())
                    .col(ColumnDef::new(Emote::CreatedBy).string_len(32))
                    .col(ColumnDef::new(Emote::UpdatedBy).string_len(32))
                    .col(
                        ColumnDef::new(Emote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Emote::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Emote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Emote {
    Table,
    Id,
    CanonicalName,
    SingleImageExtension,
    ImgAnimation,
    Width,
    Height,
    HasHover,
    SingleHoverImageExtension,
    HoverAnimation,
    HoverWidth,
    HoverHeight,
    Src,
    AltText,
    Css,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}
