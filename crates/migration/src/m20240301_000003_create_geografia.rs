//! Create `ciudad`, `distrito` and `nucleo` tables (geographic location chain).
use sea_orm_migration::{prelude::*, schema::*};

use crate::columns::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut ciudad = Table::create();
        ciudad
            .table(Ciudad::Table)
            .if_not_exists()
            .col(uuid(Ciudad::Id).primary_key())
            .col(string_len(Ciudad::Code, 32).unique_key().not_null())
            .col(string_len(Ciudad::Name, 255).not_null());
        audit_columns(&mut ciudad);
        manager.create_table(ciudad.to_owned()).await?;

        let mut distrito = Table::create();
        distrito
            .table(Distrito::Table)
            .if_not_exists()
            .col(uuid(Distrito::Id).primary_key())
            .col(uuid(Distrito::CiudadId).not_null())
            .col(string_len(Distrito::Code, 32).not_null())
            .col(string_len(Distrito::Name, 255).not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_distrito_ciudad")
                    .from(Distrito::Table, Distrito::CiudadId)
                    .to(Ciudad::Table, Ciudad::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade),
            );
        audit_columns(&mut distrito);
        manager.create_table(distrito.to_owned()).await?;

        // Code is unique within its city
        manager
            .create_index(
                Index::create()
                    .name("uniq_distrito_ciudad_code")
                    .table(Distrito::Table)
                    .col(Distrito::CiudadId)
                    .col(Distrito::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let mut nucleo = Table::create();
        nucleo
            .table(Nucleo::Table)
            .if_not_exists()
            .col(uuid(Nucleo::Id).primary_key())
            .col(uuid(Nucleo::DistritoId).not_null())
            .col(string_len(Nucleo::Code, 32).unique_key().not_null())
            .col(string_len(Nucleo::Name, 255).not_null())
            .col(ColumnDef::new(Nucleo::Address).string_len(255).null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_nucleo_distrito")
                    .from(Nucleo::Table, Nucleo::DistritoId)
                    .to(Distrito::Table, Distrito::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade),
            );
        audit_columns(&mut nucleo);
        manager.create_table(nucleo.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Nucleo::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Distrito::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Ciudad::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Ciudad { Table, Id, Code, Name }

#[derive(DeriveIden)]
enum Distrito { Table, Id, CiudadId, Code, Name }

#[derive(DeriveIden)]
enum Nucleo { Table, Id, DistritoId, Code, Name, Address }
