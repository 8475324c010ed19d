//! Create `ufv` table: one valuation index value per calendar date.
use sea_orm_migration::{prelude::*, schema::*};

use crate::columns::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(Ufv::Table)
            .if_not_exists()
            .col(uuid(Ufv::Id).primary_key())
            .col(date(Ufv::Date).unique_key().not_null())
            .col(double(Ufv::Value).not_null());
        audit_columns(&mut table);
        manager.create_table(table.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Ufv::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Ufv { Table, Id, Date, Value }
