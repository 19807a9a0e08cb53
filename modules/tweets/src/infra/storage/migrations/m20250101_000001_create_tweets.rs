use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tweets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tweets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tweets::Description).text().not_null())
                    .col(ColumnDef::new(Tweets::UserId).uuid().not_null())
                    .col(ColumnDef::new(Tweets::UserDetails).json().null())
                    .col(
                        ColumnDef::new(Tweets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tweets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tweets_user_id")
                    .table(Tweets::Table)
                    .col(Tweets::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TweetLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TweetLikes::TweetId).uuid().not_null())
                    .col(ColumnDef::new(TweetLikes::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(TweetLikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TweetLikes::TweetId)
                            .col(TweetLikes::UserId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TweetLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tweets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tweets {
    Table,
    Id,
    Description,
    UserId,
    UserDetails,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TweetLikes {
    Table,
    TweetId,
    UserId,
    CreatedAt,
}
