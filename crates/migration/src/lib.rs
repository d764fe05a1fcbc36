//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_account;
mod m20240101_000002_create_profile;
mod m20240101_000003_create_user_role;
mod m20240101_000004_create_user_credentials;
mod m20240101_000005_create_demand;
mod m20240101_000006_create_demand_deliverable;
mod m20240101_000007_create_producer_availability;
mod m20240101_000008_create_app_config;
mod m20240101_000009_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_account::Migration),
            Box::new(m20240101_000002_create_profile::Migration),
            Box::new(m20240101_000003_create_user_role::Migration),
            Box::new(m20240101_000004_create_user_credentials::Migration),
            Box::new(m20240101_000005_create_demand::Migration),
            Box::new(m20240101_000006_create_demand_deliverable::Migration),
            Box::new(m20240101_000007_create_producer_availability::Migration),
            Box::new(m20240101_000008_create_app_config::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000009_add_indexes::Migration),
        ]
    }
}
