//! Create `audit_log` table (append-only trail of mutations and logins).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(uuid(AuditLog::Id).primary_key())
                    .col(ColumnDef::new(AuditLog::UserId).uuid().null())
                    .col(string_len(AuditLog::Action, 32).not_null())
                    .col(string_len(AuditLog::Entity, 64).not_null())
                    .col(ColumnDef::new(AuditLog::EntityId).uuid().null())
                    .col(json_binary(AuditLog::Detail).not_null())
                    .col(timestamp_with_time_zone(AuditLog::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AuditLog::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AuditLog { Table, Id, UserId, Action, Entity, EntityId, Detail, CreatedAt }
