use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to tracks: a queued row may outlive its track and is
        // cleaned up by the next drain pass.
        manager
            .create_table(
                Table::create()
                    .table(PendingUpdates::Table)
                    .if_not_exists()
                    .col(big_integer(PendingUpdates::TrackId).primary_key())
                    .col(double(PendingUpdates::LastChapterRead))
                    .col(timestamp_with_time_zone(PendingUpdates::QueuedAt))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingUpdates::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum PendingUpdates {
    Table,
    TrackId,
    LastChapterRead,
    QueuedAt,
}
