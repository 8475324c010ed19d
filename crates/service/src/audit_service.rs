//! Audit trail (`bitacora`): one row per mutation, login and password change.

use chrono::{NaiveDate, Utc};
use models::audit_log;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, Page, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Crear,
    Actualizar,
    Estado,
    Eliminar,
    Baja,
    Anular,
    Login,
    Password,
    Permisos,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Crear => "CREAR",
            AuditAction::Actualizar => "ACTUALIZAR",
            AuditAction::Estado => "ESTADO",
            AuditAction::Eliminar => "ELIMINAR",
            AuditAction::Baja => "BAJA",
            AuditAction::Anular => "ANULAR",
            AuditAction::Login => "LOGIN",
            AuditAction::Password => "PASSWORD",
            AuditAction::Permisos => "PERMISOS",
        }
    }
}

/// Append an audit row on `conn` (a transaction when the caller has one open).
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    actor: Option<Uuid>,
    action: AuditAction,
    entity: &str,
    entity_id: Option<Uuid>,
    detail: serde_json::Value,
) -> Result<(), ServiceError> {
    audit_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(actor),
        action: Set(action.as_str().to_string()),
        entity: Set(entity.to_string()),
        entity_id: Set(entity_id),
        detail: Set(detail),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    debug!(action = action.as_str(), entity, ?entity_id, ?actor, "audit_recorded");
    Ok(())
}

/// Model snapshot stored in `detail`.
pub fn snapshot<T: Serialize>(model: &T) -> serde_json::Value {
    serde_json::to_value(model).unwrap_or(serde_json::Value::Null)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub entity: Option<String>,
    pub user_id: Option<Uuid>,
    pub action: Option<AuditAction>,
    /// Inclusive day range on `created_at` (UTC).
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Newest first.
pub async fn list(db: &DatabaseConnection, filter: &AuditFilter) -> Result<Page<audit_log::Model>, ServiceError> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(ServiceError::validation("'from' must not be after 'to'"));
        }
    }
    let mut q = audit_log::Entity::find();
    if let Some(entity) = filter.entity.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        q = q.filter(audit_log::Column::Entity.eq(entity));
    }
    if let Some(uid) = filter.user_id {
        q = q.filter(audit_log::Column::UserId.eq(uid));
    }
    if let Some(action) = filter.action {
        q = q.filter(audit_log::Column::Action.eq(action.as_str()));
    }
    if let Some(from) = filter.from.and_then(|d| d.and_hms_opt(0, 0, 0)) {
        q = q.filter(audit_log::Column::CreatedAt.gte(from.and_utc()));
    }
    if let Some(to) = filter.to.and_then(|d| d.succ_opt()).and_then(|d| d.and_hms_opt(0, 0, 0)) {
        q = q.filter(audit_log::Column::CreatedAt.lt(to.and_utc()));
    }
    let d = Pagination::default();
    let opts = Pagination { page: filter.page.unwrap_or(d.page), per_page: filter.per_page.unwrap_or(d.per_page) };
    fetch_page(q.order_by_desc(audit_log::Column::CreatedAt), db, opts).await
}
