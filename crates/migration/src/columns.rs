//! Columns shared by every business table: soft-delete status plus audit trail.
use sea_orm_migration::{prelude::*, schema::*};

pub fn audit_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(string_len(Alias::new("status"), 16).not_null())
        .col(ColumnDef::new(Alias::new("created_by")).uuid().null())
        .col(ColumnDef::new(Alias::new("updated_by")).uuid().null())
        .col(timestamp_with_time_zone(Alias::new("created_at")).not_null())
        .col(timestamp_with_time_zone(Alias::new("updated_at")).not_null())
}
