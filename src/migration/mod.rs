//! Migrations SeaORM (schéma complet de la plateforme)

use sea_orm_migration::prelude::*;

mod m20260101_000001_create_users;
mod m20260101_000002_create_catalog;
mod m20260101_000003_create_products;
mod m20260101_000004_create_affiliates;
mod m20260101_000005_create_orders;
mod m20260101_000006_create_enrollments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_users::Migration),
            Box::new(m20260101_000002_create_catalog::Migration),
            Box::new(m20260101_000003_create_products::Migration),
            Box::new(m20260101_000004_create_affiliates::Migration),
            Box::new(m20260101_000005_create_orders::Migration),
            Box::new(m20260101_000006_create_enrollments::Migration),
        ]
    }
}
