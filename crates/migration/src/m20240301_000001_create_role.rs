//! Create `role` table.
use sea_orm_migration::{prelude::*, schema::*};

use crate::columns::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(Role::Table)
            .if_not_exists()
            .col(uuid(Role::Id).primary_key())
            .col(string_len(Role::Name, 64).unique_key().not_null())
            .col(ColumnDef::new(Role::Description).string_len(255).null());
        audit_columns(&mut table);
        manager.create_table(table.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Role::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Role { Table, Id, Name, Description }
