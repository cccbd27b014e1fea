//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_emote_table;
mod m20250101_000002_create_tag_tables;
mod m20250101_000003_create_emote_name_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_emote_table::Migration),
            Box::new(m20250101_000002_create_tag_tables::Migration),
            Box::new(m20250101_000003_create_emote_name_table::Migration),
        ]
    }
}
