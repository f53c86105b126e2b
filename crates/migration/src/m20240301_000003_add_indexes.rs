use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Review: lookups by parent movie
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_movie")
                    .table(Review::Table)
                    .col(Review::MovieId)
                    .to_owned(),
            )
            .await?;

        // Movie: listing is ordered by title
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_movie_title")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .to_owned(),
            )
            .await?;

        // Movie: date range filter
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_movie_date_added")
                    .table(Movie::Table)
                    .col(Movie::DateAdded)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_movie_date_added").table(Movie::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_movie_title").table(Movie::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_review_movie").table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Movie { Table, Title, DateAdded }

#[derive(DeriveIden)]
enum Review { Table, MovieId }
