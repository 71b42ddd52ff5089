//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20260101_000001_create_account_tables;
mod m20260101_000002_create_status_tables;
mod m20260101_000003_create_filter_tables;
mod m20260101_000004_create_emoji_reaction_tables;
mod m20260101_000005_create_federation_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_account_tables::Migration),
            Box::new(m20260101_000002_create_status_tables::Migration),
            Box::new(m20260101_000003_create_filter_tables::Migration),
            Box::new(m20260101_000004_create_emoji_reaction_tables::Migration),
            Box::new(m20260101_000005_create_federation_tables::Migration),
        ]
    }
}
