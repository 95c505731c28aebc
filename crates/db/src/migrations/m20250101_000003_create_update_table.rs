//! Create update table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Update::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Update::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Update::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Update::Content).text().not_null())
                    .col(
                        ColumnDef::new(Update::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_update_user")
                            .from(Update::Table, Update::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_at (feed pages, newest first)
        manager
            .create_index(
                Index::create()
                    .name("idx_update_created_at")
                    .table(Update::Table)
                    .col(Update::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, created_at) for profile pages
        manager
            .create_index(
                Index::create()
                    .name("idx_update_user_id_created_at")
                    .table(Update::Table)
                    .col(Update::UserId)
                    .col(Update::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Update::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Update {
    Table,
    Id,
    UserId,
    Content,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
