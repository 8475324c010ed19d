use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, table, columns)
const INDEXES: &[(&str, &str, &[&str])] = &[
    ("idx_distrito_ciudad", "distrito", &["ciudad_id"]),
    ("idx_nucleo_distrito", "nucleo", &["distrito_id"]),
    ("idx_area_unidad", "area", &["unidad_organizacional_id"]),
    ("idx_ambiente_area", "ambiente", &["area_id"]),
    ("idx_cargo_ambiente", "cargo", &["ambiente_id"]),
    ("idx_personal_cargo", "personal", &["cargo_id"]),
    ("idx_auxiliar_grupo", "auxiliar", &["grupo_contable_id"]),
    ("idx_user_role", "user", &["role_id"]),
    ("idx_edificio_nucleo", "edificio", &["nucleo_id"]),
    ("idx_edificio_auxiliar", "edificio", &["auxiliar_id"]),
    ("idx_ampliacion_edificio", "ampliacion", &["edificio_id"]),
    ("idx_remodelacion_edificio", "remodelacion", &["edificio_id"]),
    ("idx_baja_edificio", "baja", &["edificio_id", "status"]),
    ("idx_audit_log_entity", "audit_log", &["entity", "entity_id"]),
    ("idx_audit_log_created", "audit_log", &["created_at"]),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, cols) in INDEXES {
            let mut idx = Index::create();
            idx.name(*name).table(Alias::new(*table));
            for c in cols.iter() {
                idx.col(Alias::new(*c));
            }
            manager.create_index(idx.to_owned()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in INDEXES {
            manager
                .drop_index(Index::drop().name(*name).table(Alias::new(*table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
