use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tracks::Table)
                    .if_not_exists()
                    .col(big_integer(Tracks::Id).primary_key())
                    .col(big_integer(Tracks::MangaId))
                    .col(big_integer(Tracks::SyncId))
                    .col(big_integer(Tracks::RemoteId))
                    .col(string(Tracks::Title))
                    .col(double(Tracks::LastChapterRead))
                    .col(big_integer(Tracks::TotalChapters))
                    .col(big_integer(Tracks::Status))
                    .col(double(Tracks::Score))
                    .col(string(Tracks::RemoteUrl))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tracks::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Tracks {
    Table,
    Id,
    MangaId,
    SyncId,
    RemoteId,
    Title,
    LastChapterRead,
    TotalChapters,
    Status,
    Score,
    RemoteUrl,
}
