//! Create `app_config` key/value table (JSON values).
//!
//! Currently holds the `setup_complete` bootstrap flag.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppConfig::Table)
                    .if_not_exists()
                    .col(string_len(AppConfig::Key, 64).primary_key())
                    .col(json_binary(AppConfig::Value).not_null())
                    .col(timestamp_with_time_zone(AppConfig::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AppConfig::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AppConfig { Table, Key, Value, UpdatedAt }
