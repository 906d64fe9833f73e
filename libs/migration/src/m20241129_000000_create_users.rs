use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(text(Users::Id).primary_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).text().not_null().unique_key())
                    .col(text(Users::Role))
                    .col(big_integer(Users::ReputationScore).default(0))
                    .col(json_binary(Users::Badges).default(Expr::cust("'[]'::jsonb")))
                    .col(boolean(Users::IsBanned).default(false))
                    .col(timestamp_with_time_zone_null(Users::BannedAt))
                    .col(timestamp_with_time_zone_null(Users::BanStartDate))
                    .col(timestamp_with_time_zone_null(Users::BanEndDate))
                    .col(text(Users::ReasonForBan).default(""))
                    .col(boolean(Users::IsBanIndefinite).default(false))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Keyset pagination orders and filters on created_at.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_created_at")
                    .table(Users::Table)
                    .col(Users::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Role,
    ReputationScore,
    Badges,
    IsBanned,
    BannedAt,
    BanStartDate,
    BanEndDate,
    ReasonForBan,
    IsBanIndefinite,
    CreatedAt,
    UpdatedAt,
}
