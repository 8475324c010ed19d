use chrono::{NaiveDate, Utc};
use models::validation::{non_negative, optional_text, positive, required_text, MAX_TEXT_LEN};
use models::{ampliacion, status, Status};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use super::{not_before_acquisition, open_edificio, MovimientoFilter};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct AmpliacionInput {
    pub edificio_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub added_surface_m2: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub document: Option<String>,
}

/// The building of an ampliación never changes.
#[derive(Debug, Clone, Deserialize)]
pub struct AmpliacionUpdate {
    pub date: NaiveDate,
    pub description: String,
    pub added_surface_m2: f64,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub document: Option<String>,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &MovimientoFilter) -> Result<Page<ampliacion::Model>, ServiceError> {
    let mut q = with_status(ampliacion::Entity::find(), params)?;
    if let Some(id) = filter.edificio_id {
        q = q.filter(ampliacion::Column::EdificioId.eq(id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[ampliacion::Column::Description], &term));
    }
    fetch_page(q.order_by_desc(ampliacion::Column::Date), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<ampliacion::Model, ServiceError> {
    status_service::find::<ampliacion::Entity, _>(db, id).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: AmpliacionInput) -> Result<ampliacion::Model, ServiceError> {
    let description = required_text("description", &input.description, MAX_TEXT_LEN)?;
    let surface = positive("added_surface_m2", input.added_surface_m2)?;
    let value = non_negative("value", input.value)?;
    let edificio = open_edificio(db, input.edificio_id).await?;
    not_before_acquisition(&edificio, input.date)?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = ampliacion::ActiveModel {
        id: Set(id),
        edificio_id: Set(edificio.id),
        date: Set(input.date),
        description: Set(description),
        added_surface_m2: Set(surface),
        value: Set(value),
        document: Set(optional_text("document", input.document.as_deref(), 128)?),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: AmpliacionUpdate) -> Result<ampliacion::Model, ServiceError> {
    let current = get(db, id).await?;
    let description = required_text("description", &input.description, MAX_TEXT_LEN)?;
    let surface = positive("added_surface_m2", input.added_surface_m2)?;
    let value = non_negative("value", input.value)?;
    let edificio = open_edificio(db, current.edificio_id).await?;
    not_before_acquisition(&edificio, input.date)?;

    let mut am: ampliacion::ActiveModel = current.into();
    am.date = Set(input.date);
    am.description = Set(description);
    am.added_surface_m2 = Set(surface);
    am.value = Set(value);
    am.document = Set(optional_text("document", input.document.as_deref(), 128)?);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

pub async fn toggle(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<Status, ServiceError> {
    let current = get(db, id).await?;
    open_edificio(db, current.edificio_id).await?;
    status_service::toggle::<ampliacion::Entity>(db, actor, id).await
}

pub async fn delete(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let current = get(db, id).await?;
    open_edificio(db, current.edificio_id).await?;
    status_service::soft_delete::<ampliacion::Entity>(db, actor, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edificio_service::tests::{day, seed_edificio};
    use crate::edificio_service;
    use crate::test_support::db_or_skip;

    #[tokio::test]
    async fn ampliacion_rules_and_surface() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let e = seed_edificio(&db, actor).await?;

        let input = AmpliacionInput {
            edificio_id: e.id,
            date: day(1899, 12, 31),
            description: "Segundo bloque".into(),
            added_surface_m2: 300.0,
            value: 250.0,
            document: None,
        };
        assert!(matches!(create(&db, actor, input.clone()).await, Err(ServiceError::Validation(_))));

        let a = create(&db, actor, AmpliacionInput { date: day(1900, 3, 1), ..input.clone() }).await?;
        let h = edificio_service::history(&db, e.id).await?;
        assert_eq!(h.ampliaciones.len(), 1);
        assert_eq!(h.total_built_surface_m2, 1500.0);

        toggle(&db, actor, a.id).await?;
        let h = edificio_service::history(&db, e.id).await?;
        assert_eq!(h.total_built_surface_m2, 1200.0);

        let zero = AmpliacionInput { added_surface_m2: 0.0, date: day(1900, 3, 1), ..input };
        assert!(matches!(create(&db, actor, zero).await, Err(ServiceError::Model(_))));
        Ok(())
    }
}
