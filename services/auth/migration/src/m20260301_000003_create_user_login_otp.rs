use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserLoginOtp::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserLoginOtp::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // One row per user: issuance is an insert-or-recycle on this key.
                    .col(
                        ColumnDef::new(UserLoginOtp::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserLoginOtp::Otp).string().not_null())
                    .col(
                        ColumnDef::new(UserLoginOtp::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserLoginOtp::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserLoginOtp::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserLoginOtp::Table, UserLoginOtp::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(UserLoginOtp::Table)
                    .col(UserLoginOtp::Otp)
                    .name("idx_user_login_otp_otp")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserLoginOtp::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserLoginOtp {
    Table,
    Id,
    UserId,
    Otp,
    IsUsed,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
