//! Create `demand` table.
//!
//! Status is a plain string column holding the pipeline stage
//! (aguardando / em_producao / concluido); validation lives in models.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Demand::Table)
                    .if_not_exists()
                    .col(uuid(Demand::Id).primary_key())
                    .col(string_len(Demand::Name, 255).not_null())
                    .col(ColumnDef::new(Demand::ArtistName).string_len(128).null())
                    .col(ColumnDef::new(Demand::Description).text().null())
                    .col(string_len(Demand::ProducerName, 128).not_null())
                    .col(string_len(Demand::Status, 32).not_null())
                    .col(ColumnDef::new(Demand::StartAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Demand::DueAt).timestamp_with_time_zone().null())
                    .col(uuid(Demand::CreatedBy).not_null())
                    .col(timestamp_with_time_zone(Demand::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Demand::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_demand_creator")
                            .from(Demand::Table, Demand::CreatedBy)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Demand::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Demand {
    Table,
    Id,
    Name,
    ArtistName,
    Description,
    ProducerName,
    Status,
    StartAt,
    DueAt,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Account { Table, Id }
