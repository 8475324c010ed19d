//! Migrator registering table-group migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod columns;
mod m20240301_000001_create_role;
mod m20240301_000002_create_permission;
mod m20240301_000003_create_geografia;
mod m20240301_000004_create_estructura;
mod m20240301_000005_create_contabilidad;
mod m20240301_000006_create_ufv;
mod m20240301_000007_create_user;
mod m20240301_000008_create_audit_log;
mod m20240301_000009_create_edificio;
mod m20240301_000099_add_indexes;
mod m20240301_000100_unique_active_baja;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_role::Migration),
            Box::new(m20240301_000002_create_permission::Migration),
            Box::new(m20240301_000003_create_geografia::Migration),
            Box::new(m20240301_000004_create_estructura::Migration),
            Box::new(m20240301_000005_create_contabilidad::Migration),
            Box::new(m20240301_000006_create_ufv::Migration),
            // user references role and personal
            Box::new(m20240301_000007_create_user::Migration),
            Box::new(m20240301_000008_create_audit_log::Migration),
            Box::new(m20240301_000009_create_edificio::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000099_add_indexes::Migration),
            Box::new(m20240301_000100_unique_active_baja::Migration),
        ]
    }
}
