use chrono::Utc;
use models::validation::{normalize_code, validate_name};
use models::{area, status, unidad_organizacional as unidad};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct AreaInput {
    pub unidad_organizacional_id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaFilter {
    pub unidad_organizacional_id: Option<Uuid>,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &AreaFilter) -> Result<Page<area::Model>, ServiceError> {
    let mut q = with_status(area::Entity::find(), params)?;
    if let Some(unidad_id) = filter.unidad_organizacional_id {
        q = q.filter(area::Column::UnidadOrganizacionalId.eq(unidad_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[area::Column::Code, area::Column::Name], &term));
    }
    fetch_page(q.order_by_asc(area::Column::Code), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<area::Model, ServiceError> {
    status_service::find::<area::Entity, _>(db, id).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: AreaInput) -> Result<area::Model, ServiceError> {
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    status_service::require_active::<unidad::Entity, _>(db, input.unidad_organizacional_id).await?;
    ensure_unique::<area::Entity, _, _>(db, area::Column::Code, "code", code.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = area::ActiveModel {
        id: Set(id),
        unidad_organizacional_id: Set(input.unidad_organizacional_id),
        code: Set(code),
        name: Set(name),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

/// The area code prefixes its ambientes, so it cannot change once any exist.
pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: AreaInput) -> Result<area::Model, ServiceError> {
    let current = get(db, id).await?;
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    if input.unidad_organizacional_id != current.unidad_organizacional_id {
        status_service::require_active::<unidad::Entity, _>(db, input.unidad_organizacional_id).await?;
    }
    if code != current.code {
        let has_ambientes = models::ambiente::Entity::find()
            .filter(models::ambiente::Column::AreaId.eq(id))
            .one(db)
            .await?
            .is_some();
        if has_ambientes {
            return Err(ServiceError::Conflict("area code is in use by its ambientes".into()));
        }
        ensure_unique::<area::Entity, _, _>(db, area::Column::Code, "code", code.clone(), Some(id)).await?;
    }

    let mut am: area::ActiveModel = current.into();
    am.unidad_organizacional_id = Set(input.unidad_organizacional_id);
    am.code = Set(code);
    am.name = Set(name);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}
