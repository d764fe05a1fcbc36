//! Create `producer_availability` table with FK to `account`.
//!
//! Free time slots producers publish for scheduling reference.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProducerAvailability::Table)
                    .if_not_exists()
                    .col(uuid(ProducerAvailability::Id).primary_key())
                    .col(uuid(ProducerAvailability::UserId).not_null())
                    .col(date(ProducerAvailability::Date).not_null())
                    .col(time(ProducerAvailability::SlotStart).not_null())
                    .col(time(ProducerAvailability::SlotEnd).not_null())
                    .col(timestamp_with_time_zone(ProducerAvailability::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_availability_account")
                            .from(ProducerAvailability::Table, ProducerAvailability::UserId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProducerAvailability::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProducerAvailability { Table, Id, UserId, Date, SlotStart, SlotEnd, CreatedAt }

#[derive(DeriveIden)]
enum Account { Table, Id }
