//! Ambientes (rooms). Codes are `{area}.{nnn}` and never change after creation.

use chrono::Utc;
use models::validation::{optional_text, validate_name, MAX_TEXT_LEN};
use models::{ambiente, area, status};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::codes;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct AmbienteInput {
    pub area_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmbienteFilter {
    pub area_id: Option<Uuid>,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &AmbienteFilter) -> Result<Page<ambiente::Model>, ServiceError> {
    let mut q = with_status(ambiente::Entity::find(), params)?;
    if let Some(area_id) = filter.area_id {
        q = q.filter(ambiente::Column::AreaId.eq(area_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[ambiente::Column::Code, ambiente::Column::Name], &term));
    }
    fetch_page(q.order_by_asc(ambiente::Column::Code), db, params.pagination()).await
}

/// Every row matching the filters, for exports.
pub async fn list_all(db: &DatabaseConnection, params: &ListParams, filter: &AmbienteFilter) -> Result<Vec<(ambiente::Model, Option<area::Model>)>, ServiceError> {
    let mut q = with_status(ambiente::Entity::find(), params)?;
    if let Some(area_id) = filter.area_id {
        q = q.filter(ambiente::Column::AreaId.eq(area_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[ambiente::Column::Code, ambiente::Column::Name], &term));
    }
    Ok(q.find_also_related(area::Entity).order_by_asc(ambiente::Column::Code).all(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<ambiente::Model, ServiceError> {
    status_service::find::<ambiente::Entity, _>(db, id).await
}

/// Code the next ambiente of `area_id` would receive.
pub async fn next_code(db: &DatabaseConnection, area_id: Uuid) -> Result<String, ServiceError> {
    let area = status_service::find::<area::Entity, _>(db, area_id).await?;
    codes::generate::<ambiente::Entity, _>(db, ambiente::Column::Code, &ambiente::code_prefix(&area.code), ambiente::CODE_WIDTH).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: AmbienteInput) -> Result<ambiente::Model, ServiceError> {
    let name = validate_name(&input.name)?;
    let area = status_service::require_active::<area::Entity, _>(db, input.area_id).await?;
    let code = codes::generate::<ambiente::Entity, _>(db, ambiente::Column::Code, &ambiente::code_prefix(&area.code), ambiente::CODE_WIDTH).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = ambiente::ActiveModel {
        id: Set(id),
        area_id: Set(area.id),
        code: Set(code),
        name: Set(name),
        floor: Set(optional_text("floor", input.floor.as_deref(), 32)?),
        description: Set(optional_text("description", input.description.as_deref(), MAX_TEXT_LEN)?),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

/// Moving an ambiente to another area keeps its code.
pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: AmbienteInput) -> Result<ambiente::Model, ServiceError> {
    let current = get(db, id).await?;
    let name = validate_name(&input.name)?;
    if input.area_id != current.area_id {
        status_service::require_active::<area::Entity, _>(db, input.area_id).await?;
    }

    let mut am: ambiente::ActiveModel = current.into();
    am.area_id = Set(input.area_id);
    am.name = Set(name);
    am.floor = Set(optional_text("floor", input.floor.as_deref(), 32)?);
    am.description = Set(optional_text("description", input.description.as_deref(), MAX_TEXT_LEN)?);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estructura::area_service::{self, AreaInput};
    use crate::estructura::unidad_service::{self, UnidadInput};
    use crate::test_support::{db_or_skip, unique};

    #[tokio::test]
    async fn codes_follow_the_area_prefix() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let u = unidad_service::create(&db, actor, UnidadInput { code: unique("U"), name: "Administracion".into(), acronym: Some("daf".into()) }).await?;
        assert_eq!(u.acronym.as_deref(), Some("DAF"));
        let a = area_service::create(&db, actor, AreaInput { unidad_organizacional_id: u.id, code: unique("A"), name: "Contabilidad".into() }).await?;

        assert_eq!(next_code(&db, a.id).await?, format!("{}.001", a.code));
        let input = |name: &str| AmbienteInput { area_id: a.id, name: name.into(), floor: Some("2".into()), description: None };
        let first = create(&db, actor, input("Oficina 1")).await?;
        let second = create(&db, actor, input("Oficina 2")).await?;
        assert_eq!(first.code, format!("{}.001", a.code));
        assert_eq!(second.code, format!("{}.002", a.code));

        let renamed = update(&db, actor, first.id, input("Sala de reuniones")).await?;
        assert_eq!(renamed.code, first.code);

        let blocked = area_service::update(&db, actor, a.id, AreaInput { unidad_organizacional_id: u.id, code: unique("A"), name: "Contabilidad".into() }).await;
        assert!(matches!(blocked, Err(ServiceError::Conflict(_))));
        Ok(())
    }
}
