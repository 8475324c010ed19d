//! Create accounting classification: `grupo_contable` and its `auxiliar` rows.
use sea_orm_migration::{prelude::*, schema::*};

use crate::columns::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut grupo = Table::create();
        grupo
            .table(GrupoContable::Table)
            .if_not_exists()
            .col(uuid(GrupoContable::Id).primary_key())
            .col(string_len(GrupoContable::Code, 16).unique_key().not_null())
            .col(string_len(GrupoContable::Name, 255).unique_key().not_null())
            .col(integer(GrupoContable::UsefulLifeYears).not_null())
            .col(double(GrupoContable::DepreciationRate).not_null());
        audit_columns(&mut grupo);
        manager.create_table(grupo.to_owned()).await?;

        let mut auxiliar = Table::create();
        auxiliar
            .table(Auxiliar::Table)
            .if_not_exists()
            .col(uuid(Auxiliar::Id).primary_key())
            .col(uuid(Auxiliar::GrupoContableId).not_null())
            .col(string_len(Auxiliar::Code, 32).unique_key().not_null())
            .col(string_len(Auxiliar::Name, 255).not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_auxiliar_grupo_contable")
                    .from(Auxiliar::Table, Auxiliar::GrupoContableId)
                    .to(GrupoContable::Table, GrupoContable::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade),
            );
        audit_columns(&mut auxiliar);
        manager.create_table(auxiliar.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Auxiliar::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(GrupoContable::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum GrupoContable { Table, Id, Code, Name, UsefulLifeYears, DepreciationRate }

#[derive(DeriveIden)]
enum Auxiliar { Table, Id, GrupoContableId, Code, Name }
