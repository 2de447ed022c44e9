//! Migration: Create businesses table (shops and warehouses).
//!
//! A partial unique index allows at most one live warehouse per owner.

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
                    .table(Businesses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Businesses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Businesses::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Businesses::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Businesses::Name).string_len(120).not_null())
                    .col(ColumnDef::new(Businesses::Category).string().not_null())
                    .col(ColumnDef::new(Businesses::Description).text().null())
                    .col(ColumnDef::new(Businesses::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Businesses::AdminId).uuid().null())
                    .col(
                        ColumnDef::new(Businesses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Businesses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Businesses::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_businesses_owner")
                            .from(Businesses::Table, Businesses::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_businesses_owner")
                    .table(Businesses::Table)
                    .col(Businesses::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_businesses_status")
                    .table(Businesses::Table)
                    .col(Businesses::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX uq_businesses_one_warehouse \
                 ON businesses (owner_id) WHERE kind = 'warehouse' AND deleted_at IS NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Businesses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Businesses {
    Table,
    Id,
    OwnerId,
    Kind,
    Name,
    Category,
    Description,
    Status,
    AdminId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
