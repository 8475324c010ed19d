use chrono::Utc;
use models::validation::{normalize_code, validate_name};
use models::{ciudad, distrito, status};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct DistritoInput {
    pub ciudad_id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistritoFilter {
    pub ciudad_id: Option<Uuid>,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &DistritoFilter) -> Result<Page<distrito::Model>, ServiceError> {
    let mut q = with_status(distrito::Entity::find(), params)?;
    if let Some(ciudad_id) = filter.ciudad_id {
        q = q.filter(distrito::Column::CiudadId.eq(ciudad_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[distrito::Column::Code, distrito::Column::Name], &term));
    }
    fetch_page(q.order_by_asc(distrito::Column::Code), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<distrito::Model, ServiceError> {
    status_service::find::<distrito::Entity, _>(db, id).await
}

/// Codes repeat across cities, not within one.
async fn ensure_code_free<C: ConnectionTrait>(db: &C, ciudad_id: Uuid, code: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
    let mut q = distrito::Entity::find()
        .filter(distrito::Column::CiudadId.eq(ciudad_id))
        .filter(distrito::Column::Code.eq(code));
    if let Some(id) = except {
        q = q.filter(distrito::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::duplicate("distrito", "code", code));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: DistritoInput) -> Result<distrito::Model, ServiceError> {
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    status_service::require_active::<ciudad::Entity, _>(db, input.ciudad_id).await?;
    ensure_code_free(db, input.ciudad_id, &code, None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = distrito::ActiveModel {
        id: Set(id),
        ciudad_id: Set(input.ciudad_id),
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

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: DistritoInput) -> Result<distrito::Model, ServiceError> {
    let current = get(db, id).await?;
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    if input.ciudad_id != current.ciudad_id {
        status_service::require_active::<ciudad::Entity, _>(db, input.ciudad_id).await?;
    }
    if input.ciudad_id != current.ciudad_id || code != current.code {
        ensure_code_free(db, input.ciudad_id, &code, Some(id)).await?;
    }

    let mut am: distrito::ActiveModel = current.into();
    am.ciudad_id = Set(input.ciudad_id);
    am.code = Set(code);
    am.name = Set(name);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geografia::ciudad_service::{self, CiudadInput};
    use crate::test_support::{db_or_skip, unique};

    #[tokio::test]
    async fn same_code_allowed_in_different_cities() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let lpz = ciudad_service::create(&db, actor, CiudadInput { code: unique("C"), name: "La Paz".into() }).await?;
        let scz = ciudad_service::create(&db, actor, CiudadInput { code: unique("C"), name: "Santa Cruz".into() }).await?;

        let input = |ciudad_id| DistritoInput { ciudad_id, code: "D-01".into(), name: "Distrito 1".into() };
        create(&db, actor, input(lpz.id)).await?;
        create(&db, actor, input(scz.id)).await?;
        let dup = create(&db, actor, input(lpz.id)).await;
        assert!(matches!(dup, Err(ServiceError::Duplicate(_))));

        let page = list(&db, &ListParams::default(), &DistritoFilter { ciudad_id: Some(lpz.id) }).await?;
        assert_eq!(page.total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn inactive_city_is_rejected() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let c = ciudad_service::create(&db, actor, CiudadInput { code: unique("C"), name: "Oruro".into() }).await?;
        status_service::soft_delete::<ciudad::Entity>(&db, actor, c.id).await?;
        let res = create(&db, actor, DistritoInput { ciudad_id: c.id, code: "D1".into(), name: "Centro".into() }).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));

        let missing = create(&db, actor, DistritoInput { ciudad_id: Uuid::new_v4(), code: "D1".into(), name: "Centro".into() }).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
