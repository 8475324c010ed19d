use chrono::{NaiveDate, Utc};
use models::validation::{non_negative, optional_text, required_text, MAX_TEXT_LEN};
use models::{remodelacion, status, Status};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use super::{open_edificio, MovimientoFilter};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct RemodelacionInput {
    pub edificio_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub document: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemodelacionUpdate {
    pub date: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub document: Option<String>,
}

pub async fn list(
    db: &DatabaseConnection,
    params: &ListParams,
    filter: &MovimientoFilter,
) -> Result<Page<remodelacion::Model>, ServiceError> {
    let mut q = with_status(remodelacion::Entity::find(), params)?;
    if let Some(id) = filter.edificio_id {
        q = q.filter(remodelacion::Column::EdificioId.eq(id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[remodelacion::Column::Description], &term));
    }
    fetch_page(q.order_by_desc(remodelacion::Column::Date), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<remodelacion::Model, ServiceError> {
    status_service::find::<remodelacion::Entity, _>(db, id).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: RemodelacionInput) -> Result<remodelacion::Model, ServiceError> {
    let description = required_text("description", &input.description, MAX_TEXT_LEN)?;
    let value = non_negative("value", input.value)?;
    let edificio = open_edificio(db, input.edificio_id).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = remodelacion::ActiveModel {
        id: Set(id),
        edificio_id: Set(edificio.id),
        date: Set(input.date),
        description: Set(description),
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

pub async fn update(
    db: &DatabaseConnection,
    actor: Uuid,
    id: Uuid,
    input: RemodelacionUpdate,
) -> Result<remodelacion::Model, ServiceError> {
    let current = get(db, id).await?;
    let description = required_text("description", &input.description, MAX_TEXT_LEN)?;
    let value = non_negative("value", input.value)?;
    open_edificio(db, current.edificio_id).await?;

    let mut am: remodelacion::ActiveModel = current.into();
    am.date = Set(input.date);
    am.description = Set(description);
    am.value = Set(value);
    am.document = Set(optional_text("document", input.document.as_deref(), 128)?);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

pub async fn toggle(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<Status, ServiceError> {
    let current = get(db, id).await?;
    open_edificio(db, current.edificio_id).await?;
    status_service::toggle::<remodelacion::Entity>(db, actor, id).await
}

pub async fn delete(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let current = get(db, id).await?;
    open_edificio(db, current.edificio_id).await?;
    status_service::soft_delete::<remodelacion::Entity>(db, actor, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edificio_service::tests::{day, seed_edificio, seed_ufv};
    use crate::edificio_service;
    use crate::test_support::db_or_skip;

    #[tokio::test]
    async fn remodelacion_enters_valuation() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        seed_ufv(&db, actor, day(1900, 1, 1), 1.0).await?;
        seed_ufv(&db, actor, day(1900, 6, 1), 1.5).await?;
        let e = seed_edificio(&db, actor).await?;

        create(
            &db,
            actor,
            RemodelacionInput {
                edificio_id: e.id,
                date: day(1900, 2, 1),
                description: "Cambio de cubierta".into(),
                value: 100.0,
                document: Some("RA-12/1900".into()),
            },
        )
        .await?;

        let v = edificio_service::valuation(&db, e.id, Some(day(1900, 7, 1))).await?;
        assert_eq!(v.lines.len(), 2);
        assert_eq!(v.total_original, 1100.0);
        assert_eq!(v.total_adjusted, 1650.0);

        let blank = RemodelacionInput {
            edificio_id: e.id,
            date: day(1900, 2, 1),
            description: "  ".into(),
            value: 0.0,
            document: None,
        };
        assert!(matches!(create(&db, actor, blank).await, Err(ServiceError::Model(_))));
        Ok(())
    }
}
