use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // UserRole: one role per account
        manager
            .create_index(
                Index::create()
                    .name("uniq_user_role_user")
                    .table(UserRole::Table)
                    .col(UserRole::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // UserCredentials: lookups by user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_user_credentials_user")
                    .table(UserCredentials::Table)
                    .col(UserCredentials::UserId)
                    .to_owned(),
            )
            .await?;

        // Demand: dashboard listing is newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_demand_created_at")
                    .table(Demand::Table)
                    .col(Demand::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Demand: same-day conflict check queries by producer + due date
        manager
            .create_index(
                Index::create()
                    .name("idx_demand_producer_due")
                    .table(Demand::Table)
                    .col(Demand::ProducerName)
                    .col(Demand::DueAt)
                    .to_owned(),
            )
            .await?;

        // Availability: one slot per producer/date/start, ordered reads
        manager
            .create_index(
                Index::create()
                    .name("uniq_availability_user_date_start")
                    .table(ProducerAvailability::Table)
                    .col(ProducerAvailability::UserId)
                    .col(ProducerAvailability::Date)
                    .col(ProducerAvailability::SlotStart)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_availability_user_date_start").table(ProducerAvailability::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_demand_producer_due").table(Demand::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_demand_created_at").table(Demand::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_credentials_user").table(UserCredentials::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_user_role_user").table(UserRole::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum UserRole { Table, UserId }

#[derive(DeriveIden)]
enum UserCredentials { Table, UserId }

#[derive(DeriveIden)]
enum Demand { Table, ProducerName, DueAt, CreatedAt }

#[derive(DeriveIden)]
enum ProducerAvailability { Table, UserId, Date, SlotStart }
