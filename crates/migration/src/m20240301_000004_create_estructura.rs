//! Create the organizational structure: `unidad_organizacional` → `area` →
//! `ambiente` → `cargo`, and the `personal` assigned to a cargo.
use sea_orm_migration::{prelude::*, schema::*};

use crate::columns::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut unidad = Table::create();
        unidad
            .table(UnidadOrganizacional::Table)
            .if_not_exists()
            .col(uuid(UnidadOrganizacional::Id).primary_key())
            .col(string_len(UnidadOrganizacional::Code, 32).unique_key().not_null())
            .col(string_len(UnidadOrganizacional::Name, 255).not_null())
            .col(ColumnDef::new(UnidadOrganizacional::Acronym).string_len(32).null());
        audit_columns(&mut unidad);
        manager.create_table(unidad.to_owned()).await?;

        let mut area = Table::create();
        area
            .table(Area::Table)
            .if_not_exists()
            .col(uuid(Area::Id).primary_key())
            .col(uuid(Area::UnidadOrganizacionalId).not_null())
            .col(string_len(Area::Code, 32).unique_key().not_null())
            .col(string_len(Area::Name, 255).not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_area_unidad")
                    .from(Area::Table, Area::UnidadOrganizacionalId)
                    .to(UnidadOrganizacional::Table, UnidadOrganizacional::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade),
            );
        audit_columns(&mut area);
        manager.create_table(area.to_owned()).await?;

        let mut ambiente = Table::create();
        ambiente
            .table(Ambiente::Table)
            .if_not_exists()
            .col(uuid(Ambiente::Id).primary_key())
            .col(uuid(Ambiente::AreaId).not_null())
            .col(string_len(Ambiente::Code, 64).unique_key().not_null())
            .col(string_len(Ambiente::Name, 255).not_null())
            .col(ColumnDef::new(Ambiente::Floor).string_len(32).null())
            .col(ColumnDef::new(Ambiente::Description).text().null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_ambiente_area")
                    .from(Ambiente::Table, Ambiente::AreaId)
                    .to(Area::Table, Area::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade),
            );
        audit_columns(&mut ambiente);
        manager.create_table(ambiente.to_owned()).await?;

        let mut cargo = Table::create();
        cargo
            .table(Cargo::Table)
            .if_not_exists()
            .col(uuid(Cargo::Id).primary_key())
            .col(uuid(Cargo::AmbienteId).not_null())
            .col(string_len(Cargo::Code, 32).unique_key().not_null())
            .col(string_len(Cargo::Name, 255).not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_cargo_ambiente")
                    .from(Cargo::Table, Cargo::AmbienteId)
                    .to(Ambiente::Table, Ambiente::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade),
            );
        audit_columns(&mut cargo);
        manager.create_table(cargo.to_owned()).await?;

        let mut personal = Table::create();
        personal
            .table(Personal::Table)
            .if_not_exists()
            .col(uuid(Personal::Id).primary_key())
            .col(uuid(Personal::CargoId).not_null())
            .col(string_len(Personal::Ci, 20).unique_key().not_null())
            .col(string_len(Personal::FirstName, 128).not_null())
            .col(string_len(Personal::LastName, 128).not_null())
            .col(ColumnDef::new(Personal::Email).string_len(255).null())
            .col(ColumnDef::new(Personal::Phone).string_len(32).null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_personal_cargo")
                    .from(Personal::Table, Personal::CargoId)
                    .to(Cargo::Table, Cargo::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade),
            );
        audit_columns(&mut personal);
        manager.create_table(personal.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Personal::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Cargo::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Ambiente::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Area::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(UnidadOrganizacional::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UnidadOrganizacional { Table, Id, Code, Name, Acronym }

#[derive(DeriveIden)]
enum Area { Table, Id, UnidadOrganizacionalId, Code, Name }

#[derive(DeriveIden)]
enum Ambiente { Table, Id, AreaId, Code, Name, Floor, Description }

#[derive(DeriveIden)]
enum Cargo { Table, Id, AmbienteId, Code, Name }

#[derive(DeriveIden)]
enum Personal { Table, Id, CargoId, Ci, FirstName, LastName, Email, Phone }
