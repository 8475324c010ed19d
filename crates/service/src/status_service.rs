//! Soft state shared by every business table.
//!
//! Rows are looked up and flipped through the [`SoftState`] columns so a
//! single implementation covers all entities.

use chrono::Utc;
use models::{SoftState, Status};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::audit_service::{self, AuditAction};
use crate::errors::ServiceError;

/// Row by id or `NotFound`.
pub async fn find<E, C>(db: &C, id: Uuid) -> Result<E::Model, ServiceError>
where
    E: SoftState,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::id_column().eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found(E::LABEL))
}

/// Referenced row that must exist and be `ACTIVO`.
pub async fn require_active<E, C>(db: &C, id: Uuid) -> Result<E::Model, ServiceError>
where
    E: SoftState,
    C: ConnectionTrait,
{
    let model = find::<E, C>(db, id).await?;
    if !Status::is_active(E::status_of(&model)) {
        return Err(ServiceError::inactive(E::LABEL));
    }
    Ok(model)
}

pub async fn current<E, C>(db: &C, id: Uuid) -> Result<Status, ServiceError>
where
    E: SoftState,
    C: ConnectionTrait,
{
    let model = find::<E, C>(db, id).await?;
    Ok(E::status_of(&model).parse()?)
}

/// Write `status` without auditing; callers record their own action.
pub async fn write<E, C>(db: &C, actor: Option<Uuid>, id: Uuid, status: Status) -> Result<(), ServiceError>
where
    E: SoftState,
    C: ConnectionTrait,
{
    let res = E::update_many()
        .col_expr(E::status_column(), Expr::value(status.as_str()))
        .col_expr(E::updated_by_column(), Expr::value(actor))
        .col_expr(E::updated_at_column(), Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())))
        .filter(E::id_column().eq(id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found(E::LABEL));
    }
    Ok(())
}

/// Flip `ACTIVO` <-> `INACTIVO` and return the new value.
pub async fn toggle<E: SoftState>(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<Status, ServiceError> {
    let before = current::<E, _>(db, id).await?;
    let after = before.toggled();
    let txn = db.begin().await?;
    write::<E, _>(&txn, Some(actor), id, after).await?;
    audit_service::record(&txn, Some(actor), AuditAction::Estado, E::LABEL, Some(id), json!({ "from": before, "to": after })).await?;
    txn.commit().await?;
    info!(entity = E::LABEL, %id, %actor, status = %after, "status_toggled");
    Ok(after)
}

/// Soft delete: the row stays and becomes `INACTIVO`.
pub async fn soft_delete<E: SoftState>(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let before = current::<E, _>(db, id).await?;
    let txn = db.begin().await?;
    write::<E, _>(&txn, Some(actor), id, Status::Inactivo).await?;
    audit_service::record(&txn, Some(actor), AuditAction::Eliminar, E::LABEL, Some(id), json!({ "from": before })).await?;
    txn.commit().await?;
    info!(entity = E::LABEL, %id, %actor, "soft_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::ciudad;
    use models::status::{ACTIVO, INACTIVO};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn ciudad_row(status: &str) -> ciudad::Model {
        let now = Utc::now().into();
        ciudad::Model {
            id: Uuid::new_v4(),
            code: "LPZ".into(),
            name: "La Paz".into(),
            status: status.into(),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ciudad::Model>::new()])
            .into_connection();
        let err = find::<ciudad::Entity, _>(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn inactive_reference_is_validation_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ciudad_row(INACTIVO)]])
            .into_connection();
        let err = require_active::<ciudad::Entity, _>(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m.contains("inactive")));
    }

    #[tokio::test]
    async fn toggle_flips_active_to_inactive() {
        let row = ciudad_row(ACTIVO);
        let audit = models::audit_log::Model {
            id: Uuid::new_v4(),
            user_id: None,
            action: "ESTADO".into(),
            entity: "ciudad".into(),
            entity_id: Some(row.id),
            detail: json!({}),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .append_query_results([vec![audit]])
            .into_connection();
        let after = toggle::<ciudad::Entity>(&db, Uuid::new_v4(), row.id).await.unwrap();
        assert_eq!(after, Status::Inactivo);
    }

    #[tokio::test]
    async fn write_reports_missing_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .into_connection();
        let err = write::<ciudad::Entity, _>(&db, None, Uuid::new_v4(), Status::Activo).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
