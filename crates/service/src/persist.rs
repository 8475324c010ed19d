//! Audited writes shared by the entity services.
//!
//! Every insert and update runs in its own transaction together with the
//! matching `audit_log` row.

use models::SoftState;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::audit_service::{self, AuditAction};
use crate::errors::ServiceError;

type ModelOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Model;

/// Insert `am` and audit it as `CREAR`.
pub async fn insert_audited<A>(db: &DatabaseConnection, actor: Uuid, id: Uuid, am: A) -> Result<ModelOf<A>, ServiceError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + 'static,
    A::Entity: SoftState,
    ModelOf<A>: IntoActiveModel<A> + Serialize,
{
    let label = <A::Entity as SoftState>::LABEL;
    let txn = db.begin().await?;
    let saved = am.insert(&txn).await?;
    audit_service::record(&txn, Some(actor), AuditAction::Crear, label, Some(id), audit_service::snapshot(&saved)).await?;
    txn.commit().await?;
    info!(entity = label, %id, %actor, "created");
    Ok(saved)
}

/// Update `am` and audit it as `ACTUALIZAR`.
pub async fn update_audited<A>(db: &DatabaseConnection, actor: Uuid, id: Uuid, am: A) -> Result<ModelOf<A>, ServiceError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + 'static,
    A::Entity: SoftState,
    ModelOf<A>: IntoActiveModel<A> + Serialize,
{
    let label = <A::Entity as SoftState>::LABEL;
    let txn = db.begin().await?;
    let saved = am.update(&txn).await?;
    audit_service::record(&txn, Some(actor), AuditAction::Actualizar, label, Some(id), audit_service::snapshot(&saved)).await?;
    txn.commit().await?;
    info!(entity = label, %id, %actor, "updated");
    Ok(saved)
}

/// `Duplicate` when another row of `E` already holds `value` in `column`.
pub async fn ensure_unique<E, C, V>(
    db: &C,
    column: E::Column,
    field: &str,
    value: V,
    except: Option<Uuid>,
) -> Result<(), ServiceError>
where
    E: SoftState,
    C: ConnectionTrait,
    V: Into<sea_orm::Value> + ToString + Clone,
{
    let mut q = E::find().filter(column.eq(value.clone()));
    if let Some(id) = except {
        q = q.filter(E::id_column().ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::duplicate(E::LABEL, field, &value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::ciudad;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn lpz() -> ciudad::Model {
        let now = Utc::now().into();
        ciudad::Model {
            id: Uuid::new_v4(),
            code: "LPZ".into(),
            name: "La Paz".into(),
            status: models::status::ACTIVO.into(),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn existing_code_is_duplicate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![lpz()]])
            .into_connection();
        let err = ensure_unique::<ciudad::Entity, _, _>(&db, ciudad::Column::Code, "code", "LPZ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(m) if m.contains("LPZ")));
    }

    #[tokio::test]
    async fn free_code_passes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ciudad::Model>::new()])
            .into_connection();
        ensure_unique::<ciudad::Entity, _, _>(&db, ciudad::Column::Code, "code", "CBB", Some(Uuid::new_v4()))
            .await
            .unwrap();
    }
}
