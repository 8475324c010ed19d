use chrono::Utc;
use models::validation::{normalize_code, optional_text, validate_name};
use models::{status, unidad_organizacional as unidad};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct UnidadInput {
    pub code: String,
    pub name: String,
    /// Sigla, e.g. `DAF`.
    #[serde(default)]
    pub acronym: Option<String>,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams) -> Result<Page<unidad::Model>, ServiceError> {
    let mut q = with_status(unidad::Entity::find(), params)?;
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[unidad::Column::Code, unidad::Column::Name, unidad::Column::Acronym], &term));
    }
    fetch_page(q.order_by_asc(unidad::Column::Code), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<unidad::Model, ServiceError> {
    status_service::find::<unidad::Entity, _>(db, id).await
}

fn acronym(value: Option<&str>) -> Result<Option<String>, ServiceError> {
    Ok(optional_text("acronym", value, 32)?.map(|a| a.to_uppercase()))
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: UnidadInput) -> Result<unidad::Model, ServiceError> {
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    ensure_unique::<unidad::Entity, _, _>(db, unidad::Column::Code, "code", code.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = unidad::ActiveModel {
        id: Set(id),
        code: Set(code),
        name: Set(name),
        acronym: Set(acronym(input.acronym.as_deref())?),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: UnidadInput) -> Result<unidad::Model, ServiceError> {
    let current = get(db, id).await?;
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    if code != current.code {
        ensure_unique::<unidad::Entity, _, _>(db, unidad::Column::Code, "code", code.clone(), Some(id)).await?;
    }

    let mut am: unidad::ActiveModel = current.into();
    am.code = Set(code);
    am.name = Set(name);
    am.acronym = Set(acronym(input.acronym.as_deref())?);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{db_or_skip, unique};

    #[tokio::test]
    async fn unidad_create_normalizes_and_rejects_duplicates() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let code = unique("u");
        let u = create(&db, actor, UnidadInput { code: code.clone(), name: "Recursos Humanos".into(), acronym: Some(" rrhh ".into()) }).await?;
        assert_eq!(u.code, code.to_uppercase());
        assert_eq!(u.acronym.as_deref(), Some("RRHH"));

        let dup = create(&db, actor, UnidadInput { code, name: "Otra".into(), acronym: None }).await;
        assert!(matches!(dup, Err(ServiceError::Duplicate(_))));

        let long = UnidadInput { code: unique("U"), name: "Sistemas".into(), acronym: Some("S".repeat(33)) };
        assert!(matches!(create(&db, actor, long).await, Err(ServiceError::Model(_))));

        let cleared = update(&db, actor, u.id, UnidadInput { code: u.code.clone(), name: "RRHH".into(), acronym: Some("  ".into()) }).await?;
        assert_eq!(cleared.acronym, None);
        Ok(())
    }
}
