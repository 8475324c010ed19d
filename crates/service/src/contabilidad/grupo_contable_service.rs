//! Grupos contables, numbered `001`, `002`, ... with their depreciation terms.

use chrono::Utc;
use models::grupo_contable::{self as grupo, validate_depreciation_rate, validate_useful_life};
use models::status;
use models::validation::validate_name;
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::codes;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct GrupoContableInput {
    pub name: String,
    pub useful_life_years: i32,
    /// Percent per year.
    pub depreciation_rate: f64,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams) -> Result<Page<grupo::Model>, ServiceError> {
    let mut q = with_status(grupo::Entity::find(), params)?;
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[grupo::Column::Code, grupo::Column::Name], &term));
    }
    fetch_page(q.order_by_asc(grupo::Column::Code), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<grupo::Model, ServiceError> {
    status_service::find::<grupo::Entity, _>(db, id).await
}

pub async fn next_code(db: &DatabaseConnection) -> Result<String, ServiceError> {
    codes::generate::<grupo::Entity, _>(db, grupo::Column::Code, "", grupo::CODE_WIDTH).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: GrupoContableInput) -> Result<grupo::Model, ServiceError> {
    let name = validate_name(&input.name)?;
    let useful_life = validate_useful_life(input.useful_life_years)?;
    let rate = validate_depreciation_rate(input.depreciation_rate)?;
    ensure_unique::<grupo::Entity, _, _>(db, grupo::Column::Name, "name", name.clone(), None).await?;
    let code = next_code(db).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = grupo::ActiveModel {
        id: Set(id),
        code: Set(code),
        name: Set(name),
        useful_life_years: Set(useful_life),
        depreciation_rate: Set(rate),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: GrupoContableInput) -> Result<grupo::Model, ServiceError> {
    let current = get(db, id).await?;
    let name = validate_name(&input.name)?;
    let useful_life = validate_useful_life(input.useful_life_years)?;
    let rate = validate_depreciation_rate(input.depreciation_rate)?;
    if name != current.name {
        ensure_unique::<grupo::Entity, _, _>(db, grupo::Column::Name, "name", name.clone(), Some(id)).await?;
    }

    let mut am: grupo::ActiveModel = current.into();
    am.name = Set(name);
    am.useful_life_years = Set(useful_life);
    am.depreciation_rate = Set(rate);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}
