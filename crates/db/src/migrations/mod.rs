//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250801_000001_create_poll_table;
mod m20250801_000002_create_question_table;
mod m20250801_000003_create_answer_table;
mod m20250801_000004_create_profile_tables;
mod m20250801_000005_create_walkthrough_table;
mod m20250801_000006_create_walkthrough_denorm_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_poll_table::Migration),
            Box::new(m20250801_000002_create_question_table::Migration),
            Box::new(m20250801_000003_create_answer_table::Migration),
            Box::new(m20250801_000004_create_profile_tables::Migration),
            Box::new(m20250801_000005_create_walkthrough_table::Migration),
            Box::new(m20250801_000006_create_walkthrough_denorm_tables::Migration),
        ]
    }
}
