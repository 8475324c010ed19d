//! Create `edificio` (building) and its movement records:
//! `ampliacion`, `remodelacion` and `baja`.
use sea_orm_migration::{prelude::*, schema::*};

use crate::columns::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut edificio = Table::create();
        edificio
            .table(Edificio::Table)
            .if_not_exists()
            .col(uuid(Edificio::Id).primary_key())
            .col(string_len(Edificio::Code, 32).unique_key().not_null())
            .col(string_len(Edificio::Name, 255).not_null())
            .col(string_len(Edificio::Address, 255).not_null())
            .col(uuid(Edificio::NucleoId).not_null())
            .col(uuid(Edificio::AuxiliarId).not_null())
            .col(uuid(Edificio::UnidadOrganizacionalId).not_null())
            .col(date(Edificio::AcquisitionDate).not_null())
            .col(double(Edificio::AcquisitionValue).not_null())
            .col(double(Edificio::LandSurfaceM2).not_null())
            .col(double(Edificio::BuiltSurfaceM2).not_null())
            .col(integer(Edificio::Floors).not_null())
            .col(ColumnDef::new(Edificio::DeedNumber).string_len(64).null())
            .col(ColumnDef::new(Edificio::Notes).text().null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_edificio_nucleo")
                    .from(Edificio::Table, Edificio::NucleoId)
                    .to(Nucleo::Table, Nucleo::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_edificio_auxiliar")
                    .from(Edificio::Table, Edificio::AuxiliarId)
                    .to(Auxiliar::Table, Auxiliar::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_edificio_unidad")
                    .from(Edificio::Table, Edificio::UnidadOrganizacionalId)
                    .to(UnidadOrganizacional::Table, UnidadOrganizacional::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            );
        audit_columns(&mut edificio);
        manager.create_table(edificio.to_owned()).await?;

        let mut ampliacion = Table::create();
        ampliacion
            .table(Ampliacion::Table)
            .if_not_exists()
            .col(uuid(Ampliacion::Id).primary_key())
            .col(uuid(Ampliacion::EdificioId).not_null())
            .col(date(Ampliacion::Date).not_null())
            .col(text(Ampliacion::Description).not_null())
            .col(double(Ampliacion::AddedSurfaceM2).not_null())
            .col(double(Ampliacion::Value).not_null())
            .col(ColumnDef::new(Ampliacion::Document).string_len(128).null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_ampliacion_edificio")
                    .from(Ampliacion::Table, Ampliacion::EdificioId)
                    .to(Edificio::Table, Edificio::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            );
        audit_columns(&mut ampliacion);
        manager.create_table(ampliacion.to_owned()).await?;

        let mut remodelacion = Table::create();
        remodelacion
            .table(Remodelacion::Table)
            .if_not_exists()
            .col(uuid(Remodelacion::Id).primary_key())
            .col(uuid(Remodelacion::EdificioId).not_null())
            .col(date(Remodelacion::Date).not_null())
            .col(text(Remodelacion::Description).not_null())
            .col(double(Remodelacion::Value).not_null())
            .col(ColumnDef::new(Remodelacion::Document).string_len(128).null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_remodelacion_edificio")
                    .from(Remodelacion::Table, Remodelacion::EdificioId)
                    .to(Edificio::Table, Edificio::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            );
        audit_columns(&mut remodelacion);
        manager.create_table(remodelacion.to_owned()).await?;

        let mut baja = Table::create();
        baja
            .table(Baja::Table)
            .if_not_exists()
            .col(uuid(Baja::Id).primary_key())
            .col(uuid(Baja::EdificioId).not_null())
            .col(date(Baja::Date).not_null())
            .col(text(Baja::Reason).not_null())
            .col(string_len(Baja::Resolution, 64).not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_baja_edificio")
                    .from(Baja::Table, Baja::EdificioId)
                    .to(Edificio::Table, Edificio::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            );
        audit_columns(&mut baja);
        manager.create_table(baja.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Baja::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Remodelacion::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Ampliacion::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Edificio::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Edificio {
    Table,
    Id,
    Code,
    Name,
    Address,
    NucleoId,
    AuxiliarId,
    UnidadOrganizacionalId,
    AcquisitionDate,
    AcquisitionValue,
    LandSurfaceM2,
    BuiltSurfaceM2,
    Floors,
    DeedNumber,
    Notes,
}

#[derive(DeriveIden)]
enum Ampliacion { Table, Id, EdificioId, Date, Description, AddedSurfaceM2, Value, Document }

#[derive(DeriveIden)]
enum Remodelacion { Table, Id, EdificioId, Date, Description, Value, Document }

#[derive(DeriveIden)]
enum Baja { Table, Id, EdificioId, Date, Reason, Resolution }

#[derive(DeriveIden)]
enum Nucleo { Table, Id }

#[derive(DeriveIden)]
enum Auxiliar { Table, Id }

#[derive(DeriveIden)]
enum UnidadOrganizacional { Table, Id }
