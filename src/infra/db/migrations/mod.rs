//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_and_catalog;
mod m20240101_000002_create_enrollments;
mod m20240101_000003_create_assessments;
mod m20240101_000004_create_quizzes;
mod m20240101_000005_create_messaging;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_and_catalog::Migration),
            Box::new(m20240101_000002_create_enrollments::Migration),
            Box::new(m20240101_000003_create_assessments::Migration),
            Box::new(m20240101_000004_create_quizzes::Migration),
            Box::new(m20240101_000005_create_messaging::Migration),
        ]
    }
}
