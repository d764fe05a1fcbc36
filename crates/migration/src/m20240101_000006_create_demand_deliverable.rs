//! Create `demand_deliverable` table with FK to `demand`.
//!
//! At most one deliverable per demand; upsert semantics in models.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DemandDeliverable::Table)
                    .if_not_exists()
                    .col(uuid(DemandDeliverable::Id).primary_key())
                    .col(uuid(DemandDeliverable::DemandId).unique_key().not_null())
                    .col(ColumnDef::new(DemandDeliverable::StoragePath).string_len(512).null())
                    .col(ColumnDef::new(DemandDeliverable::FileName).string_len(255).null())
                    .col(ColumnDef::new(DemandDeliverable::Comments).text().null())
                    .col(uuid(DemandDeliverable::UploadedBy).not_null())
                    .col(timestamp_with_time_zone(DemandDeliverable::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(DemandDeliverable::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deliverable_demand")
                            .from(DemandDeliverable::Table, DemandDeliverable::DemandId)
                            .to(Demand::Table, Demand::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(DemandDeliverable::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum DemandDeliverable {
    Table,
    Id,
    DemandId,
    StoragePath,
    FileName,
    Comments,
    UploadedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Demand { Table, Id }
