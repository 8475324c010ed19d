use chrono::Utc;
use models::validation::{normalize_code, validate_name};
use models::{ciudad, status};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct CiudadInput {
    pub code: String,
    pub name: String,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams) -> Result<Page<ciudad::Model>, ServiceError> {
    let mut q = with_status(ciudad::Entity::find(), params)?;
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[ciudad::Column::Code, ciudad::Column::Name], &term));
    }
    fetch_page(q.order_by_asc(ciudad::Column::Code), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<ciudad::Model, ServiceError> {
    status_service::find::<ciudad::Entity, _>(db, id).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: CiudadInput) -> Result<ciudad::Model, ServiceError> {
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    ensure_unique::<ciudad::Entity, _, _>(db, ciudad::Column::Code, "code", code.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = ciudad::ActiveModel {
        id: Set(id),
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

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: CiudadInput) -> Result<ciudad::Model, ServiceError> {
    let current = get(db, id).await?;
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    if code != current.code {
        ensure_unique::<ciudad::Entity, _, _>(db, ciudad::Column::Code, "code", code.clone(), Some(id)).await?;
    }

    let mut am: ciudad::ActiveModel = current.into();
    am.code = Set(code);
    am.name = Set(name);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{db_or_skip, unique};

    #[tokio::test]
    async fn ciudad_crud_and_duplicate_code() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let code = unique("C");

        let c = create(&db, actor, CiudadInput { code: code.to_lowercase(), name: " Sucre ".into() }).await?;
        assert_eq!(c.code, code.to_uppercase());
        assert_eq!(c.name, "Sucre");
        assert_eq!(c.status, status::ACTIVO);

        let dup = create(&db, actor, CiudadInput { code: code.clone(), name: "Otra".into() }).await;
        assert!(matches!(dup, Err(ServiceError::Duplicate(_))));

        let updated = update(&db, actor, c.id, CiudadInput { code: code.clone(), name: "Sucre Capital".into() }).await?;
        assert_eq!(updated.name, "Sucre Capital");

        status_service::soft_delete::<ciudad::Entity>(&db, actor, c.id).await?;
        assert_eq!(get(&db, c.id).await?.status, status::INACTIVO);
        Ok(())
    }
}
