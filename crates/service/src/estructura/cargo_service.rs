use chrono::Utc;
use models::validation::{normalize_code, validate_name};
use models::{ambiente, cargo, status};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct CargoInput {
    pub ambiente_id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CargoFilter {
    pub ambiente_id: Option<Uuid>,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &CargoFilter) -> Result<Page<cargo::Model>, ServiceError> {
    let mut q = with_status(cargo::Entity::find(), params)?;
    if let Some(ambiente_id) = filter.ambiente_id {
        q = q.filter(cargo::Column::AmbienteId.eq(ambiente_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[cargo::Column::Code, cargo::Column::Name], &term));
    }
    fetch_page(q.order_by_asc(cargo::Column::Code), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<cargo::Model, ServiceError> {
    status_service::find::<cargo::Entity, _>(db, id).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: CargoInput) -> Result<cargo::Model, ServiceError> {
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    status_service::require_active::<ambiente::Entity, _>(db, input.ambiente_id).await?;
    ensure_unique::<cargo::Entity, _, _>(db, cargo::Column::Code, "code", code.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = cargo::ActiveModel {
        id: Set(id),
        ambiente_id: Set(input.ambiente_id),
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

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: CargoInput) -> Result<cargo::Model, ServiceError> {
    let current = get(db, id).await?;
    let code = normalize_code(&input.code)?;
    let name = validate_name(&input.name)?;
    if input.ambiente_id != current.ambiente_id {
        status_service::require_active::<ambiente::Entity, _>(db, input.ambiente_id).await?;
    }
    if code != current.code {
        ensure_unique::<cargo::Entity, _, _>(db, cargo::Column::Code, "code", code.clone(), Some(id)).await?;
    }

    let mut am: cargo::ActiveModel = current.into();
    am.ambiente_id = Set(input.ambiente_id);
    am.code = Set(code);
    am.name = Set(name);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::estructura::ambiente_service::{self, AmbienteInput};
    use crate::estructura::area_service::{self, AreaInput};
    use crate::estructura::unidad_service::{self, UnidadInput};
    use crate::test_support::{db_or_skip, unique};

    /// Fresh ambiente under a new unidad and area.
    pub(crate) async fn seed_ambiente(db: &DatabaseConnection, actor: Uuid) -> Result<ambiente::Model, anyhow::Error> {
        let u = unidad_service::create(db, actor, UnidadInput { code: unique("U"), name: "Finanzas".into(), acronym: None }).await?;
        let a = area_service::create(db, actor, AreaInput { unidad_organizacional_id: u.id, code: unique("A"), name: "Tesoreria".into() }).await?;
        Ok(ambiente_service::create(db, actor, AmbienteInput { area_id: a.id, name: "Caja".into(), floor: None, description: None }).await?)
    }

    pub(crate) async fn seed_cargo(db: &DatabaseConnection, actor: Uuid) -> Result<cargo::Model, anyhow::Error> {
        let amb = seed_ambiente(db, actor).await?;
        Ok(create(db, actor, CargoInput { ambiente_id: amb.id, code: unique("K"), name: "Cajero".into() }).await?)
    }

    #[tokio::test]
    async fn cargo_codes_are_unique_and_filtered_by_ambiente() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let amb = seed_ambiente(&db, actor).await?;
        let k = create(&db, actor, CargoInput { ambiente_id: amb.id, code: unique("k"), name: "Jefe de Caja".into() }).await?;

        let dup = create(&db, actor, CargoInput { ambiente_id: amb.id, code: k.code.to_lowercase(), name: "Otro".into() }).await;
        assert!(matches!(dup, Err(ServiceError::Duplicate(_))));

        let page = list(&db, &ListParams::default(), &CargoFilter { ambiente_id: Some(amb.id) }).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, k.id);

        status_service::soft_delete::<ambiente::Entity>(&db, actor, amb.id).await?;
        let closed = create(&db, actor, CargoInput { ambiente_id: amb.id, code: unique("K"), name: "Auxiliar".into() }).await;
        assert!(matches!(closed, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
