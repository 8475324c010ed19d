pub mod errors;
pub mod db;
pub mod status;
pub mod validation;

pub mod role;
pub mod permission;
pub mod role_permission;
pub mod user;
pub mod user_credentials;
pub mod audit_log;

pub mod ciudad;
pub mod distrito;
pub mod nucleo;

pub mod unidad_organizacional;
pub mod area;
pub mod ambiente;
pub mod cargo;
pub mod personal;

pub mod grupo_contable;
pub mod auxiliar;

pub mod ufv;

pub mod edificio;
pub mod ampliacion;
pub mod remodelacion;
pub mod baja;

pub use status::{SoftState, Status};

#[cfg(test)]
mod schema_tests {
    use migration::MigratorTrait;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
    use uuid::Uuid;
    use chrono::Utc;

    use crate::{ciudad, db, distrito, status};

    #[tokio::test]
    async fn migrate_and_insert_location_chain() {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return; }
        let db = match db::connect().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return;
            }
        };
        if let Err(e) = migration::Migrator::up(&db, None).await {
            eprintln!("skip: migrate up failed: {}", e);
            return;
        }
        let txn = db.begin().await.expect("begin");
        let now = Utc::now().into();

        let c = ciudad::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(format!("C{}", &Uuid::new_v4().simple().to_string()[..8]).to_uppercase()),
            name: Set("La Paz".into()),
            status: Set(status::ACTIVO.into()),
            created_by: Set(None),
            updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .expect("insert ciudad");

        let d = distrito::ActiveModel {
            id: Set(Uuid::new_v4()),
            ciudad_id: Set(c.id),
            code: Set("D1".into()),
            name: Set("Distrito 1".into()),
            status: Set(status::ACTIVO.into()),
            created_by: Set(None),
            updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .expect("insert distrito");

        let (found, parent) = distrito::Entity::find_by_id(d.id)
            .find_also_related(ciudad::Entity)
            .one(&txn)
            .await
            .expect("query")
            .expect("distrito row");
        assert_eq!(found.code, "D1");
        assert_eq!(parent.map(|p| p.id), Some(c.id));

        txn.rollback().await.expect("rollback");
    }
}
