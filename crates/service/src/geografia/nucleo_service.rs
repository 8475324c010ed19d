use chrono::Utc;
use models::validation::{normalize_code, optional_text, validate_name};
use models::{distrito, nucleo, status};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct NucleoInput {
    pub distrito_id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NucleoFilter {
    pub distrito_id: Option<Uuid>,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &NucleoFilter) -> Result<Page<nucleo::Model>, ServiceError> {
    let mut q = with_status(nucleo::Entity::find(), params)?;
    if let Some(distrito_id) = filter.distrito_id {
        q = q.filter(nucleo::Column::DistritoId.eq(distrito_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[nucleo::Column::Code, nucleo::Column::Name], &term));
    }
    fetch_page(q.order_by_asc(nucleo::Column::Code), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<nucleo::Model, ServiceError> {
    status_service::find::<nucleo::Entity, _>(db, id).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: NucleoInput) -> Result<nucleo::Model, ServiceError> {
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    status_service::require_active::<distrito::Entity, _>(db, input.distrito_id).await?;
    ensure_unique::<nucleo::Entity, _, _>(db, nucleo::Column::Code, "code", code.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = nucleo::ActiveModel {
        id: Set(id),
        distrito_id: Set(input.distrito_id),
        code: Set(code),
        name: Set(name),
        address: Set(optional_text("address", input.address.as_deref(), 255)?),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: NucleoInput) -> Result<nucleo::Model, ServiceError> {
    let current = get(db, id).await?;
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    if input.distrito_id != current.distrito_id {
        status_service::require_active::<distrito::Entity, _>(db, input.distrito_id).await?;
    }
    if code != current.code {
        ensure_unique::<nucleo::Entity, _, _>(db, nucleo::Column::Code, "code", code.clone(), Some(id)).await?;
    }

    let mut am: nucleo::ActiveModel = current.into();
    am.distrito_id = Set(input.distrito_id);
    am.code = Set(code);
    am.name = Set(name);
    am.address = Set(optional_text("address", input.address.as_deref(), 255)?);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}
