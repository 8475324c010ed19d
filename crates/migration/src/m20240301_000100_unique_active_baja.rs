use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// At most one `ACTIVO` baja per building.
const INDEX: &str = "uq_baja_edificio_activo";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!(
                r#"CREATE UNIQUE INDEX IF NOT EXISTS "{INDEX}" ON "baja" ("edificio_id") WHERE "status" = 'ACTIVO'"#
            ))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!(r#"DROP INDEX IF EXISTS "{INDEX}""#))
            .await?;
        Ok(())
    }
}
