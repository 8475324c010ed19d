//! Auxiliares contables, coded `{grupo}.{nnnn}` under their grupo.

use chrono::Utc;
use models::validation::validate_name;
use models::{auxiliar, grupo_contable, status};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::codes;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct AuxiliarInput {
    pub grupo_contable_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuxiliarUpdate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuxiliarFilter {
    pub grupo_contable_id: Option<Uuid>,
}

fn filtered(params: &ListParams, filter: &AuxiliarFilter) -> Result<Select<auxiliar::Entity>, ServiceError> {
    let mut q = with_status(auxiliar::Entity::find(), params)?;
    if let Some(grupo_id) = filter.grupo_contable_id {
        q = q.filter(auxiliar::Column::GrupoContableId.eq(grupo_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[auxiliar::Column::Code, auxiliar::Column::Name], &term));
    }
    Ok(q.order_by_asc(auxiliar::Column::Code))
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &AuxiliarFilter) -> Result<Page<auxiliar::Model>, ServiceError> {
    fetch_page(filtered(params, filter)?, db, params.pagination()).await
}

pub async fn list_all(
    db: &DatabaseConnection,
    params: &ListParams,
    filter: &AuxiliarFilter,
) -> Result<Vec<(auxiliar::Model, Option<grupo_contable::Model>)>, ServiceError> {
    Ok(filtered(params, filter)?.find_also_related(grupo_contable::Entity).all(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<auxiliar::Model, ServiceError> {
    status_service::find::<auxiliar::Entity, _>(db, id).await
}

pub async fn next_code(db: &DatabaseConnection, grupo_contable_id: Uuid) -> Result<String, ServiceError> {
    let grupo = status_service::find::<grupo_contable::Entity, _>(db, grupo_contable_id).await?;
    codes::generate::<auxiliar::Entity, _>(db, auxiliar::Column::Code, &auxiliar::code_prefix(&grupo.code), auxiliar::CODE_WIDTH).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: AuxiliarInput) -> Result<auxiliar::Model, ServiceError> {
    let name = validate_name(&input.name)?;
    let grupo = status_service::require_active::<grupo_contable::Entity, _>(db, input.grupo_contable_id).await?;
    let code = codes::generate::<auxiliar::Entity, _>(db, auxiliar::Column::Code, &auxiliar::code_prefix(&grupo.code), auxiliar::CODE_WIDTH).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = auxiliar::ActiveModel {
        id: Set(id),
        grupo_contable_id: Set(grupo.id),
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

/// The grupo is fixed by the code, so only the name changes.
pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: AuxiliarUpdate) -> Result<auxiliar::Model, ServiceError> {
    let current = get(db, id).await?;
    let name = validate_name(&input.name)?;

    let mut am: auxiliar::ActiveModel = current.into();
    am.name = Set(name);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contabilidad::grupo_contable_service::{self, GrupoContableInput};
    use crate::test_support::{db_or_skip, unique};

    #[tokio::test]
    async fn auxiliar_codes_nest_under_grupo() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let grupo = grupo_contable_service::create(
            &db,
            actor,
            GrupoContableInput { name: unique("Edificaciones "), useful_life_years: 40, depreciation_rate: 2.5 },
        )
        .await?;
        assert_eq!(grupo.code.len(), 3);

        let a1 = create(&db, actor, AuxiliarInput { grupo_contable_id: grupo.id, name: "Oficinas".into() }).await?;
        let a2 = create(&db, actor, AuxiliarInput { grupo_contable_id: grupo.id, name: "Almacenes".into() }).await?;
        assert_eq!(a1.code, format!("{}.0001", grupo.code));
        assert_eq!(a2.code, format!("{}.0002", grupo.code));
        assert_eq!(next_code(&db, grupo.id).await?, format!("{}.0003", grupo.code));

        let dup = grupo_contable_service::create(
            &db,
            actor,
            GrupoContableInput { name: grupo.name.clone(), useful_life_years: 10, depreciation_rate: 10.0 },
        )
        .await;
        assert!(matches!(dup, Err(ServiceError::Duplicate(_))));
        Ok(())
    }
}
