//! Migration: Create role_requests table.
//!
//! A partial unique index allows at most one pending request per user.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoleRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoleRequests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RoleRequests::UserId).uuid().not_null())
                    .col(ColumnDef::new(RoleRequests::RequestedRole).small_integer().not_null())
                    .col(ColumnDef::new(RoleRequests::Status).string_len(16).not_null())
                    .col(ColumnDef::new(RoleRequests::AdminId).uuid().null())
                    .col(
                        ColumnDef::new(RoleRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoleRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_requests_user")
                            .from(RoleRequests::Table, RoleRequests::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_requests_admin")
                            .from(RoleRequests::Table, RoleRequests::AdminId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_role_requests_status")
                    .table(RoleRequests::Table)
                    .col(RoleRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX uq_role_requests_one_pending \
                 ON role_requests (user_id) WHERE status = 'pending'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoleRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RoleRequests {
    Table,
    Id,
    UserId,
    RequestedRole,
    Status,
    AdminId,
    CreatedAt,
    UpdatedAt,
}
