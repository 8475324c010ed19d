//! Daily UFV index. Valuation reads only `ACTIVO` rows.

use chrono::{NaiveDate, Utc};
use models::{status, ufv};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct UfvInput {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UfvUpdate {
    pub value: f64,
}

/// Inclusive date range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UfvRange {
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
}

impl UfvRange {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if let (Some(d), Some(h)) = (self.desde, self.hasta) {
            if d > h {
                return Err(ServiceError::validation("'desde' must not be after 'hasta'"));
            }
        }
        Ok(())
    }
}

fn filtered(params: &ListParams, range: &UfvRange) -> Result<Select<ufv::Entity>, ServiceError> {
    range.validate()?;
    let mut q = with_status(ufv::Entity::find(), params)?;
    if let Some(d) = range.desde {
        q = q.filter(ufv::Column::Date.gte(d));
    }
    if let Some(h) = range.hasta {
        q = q.filter(ufv::Column::Date.lte(h));
    }
    Ok(q)
}

/// Newest first.
pub async fn list(db: &DatabaseConnection, params: &ListParams, range: &UfvRange) -> Result<Page<ufv::Model>, ServiceError> {
    let q = filtered(params, range)?.order_by_desc(ufv::Column::Date);
    fetch_page(q, db, params.pagination()).await
}

/// Oldest first, for the printed series.
pub async fn list_all(db: &DatabaseConnection, params: &ListParams, range: &UfvRange) -> Result<Vec<ufv::Model>, ServiceError> {
    Ok(filtered(params, range)?.order_by_asc(ufv::Column::Date).all(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<ufv::Model, ServiceError> {
    status_service::find::<ufv::Entity, _>(db, id).await
}

pub async fn by_date(db: &DatabaseConnection, date: NaiveDate) -> Result<ufv::Model, ServiceError> {
    ufv::Entity::find()
        .filter(ufv::Column::Date.eq(date))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("ufv for {date} not found")))
}

pub async fn latest(db: &DatabaseConnection) -> Result<ufv::Model, ServiceError> {
    ufv::Entity::find()
        .filter(ufv::Column::Status.eq(status::ACTIVO))
        .order_by_desc(ufv::Column::Date)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("ufv"))
}

/// Most recent active index on or before `date`.
pub async fn value_at<C: ConnectionTrait>(db: &C, date: NaiveDate) -> Result<ufv::Model, ServiceError> {
    ufv::Entity::find()
        .filter(ufv::Column::Status.eq(status::ACTIVO))
        .filter(ufv::Column::Date.lte(date))
        .order_by_desc(ufv::Column::Date)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("no ufv on or before {date}")))
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: UfvInput) -> Result<ufv::Model, ServiceError> {
    let value = ufv::normalize_value(input.value)?;
    ensure_unique::<ufv::Entity, _, _>(db, ufv::Column::Date, "date", input.date, None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = ufv::ActiveModel {
        id: Set(id),
        date: Set(input.date),
        value: Set(value),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

/// Only the value is editable; the date identifies the record.
pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: UfvUpdate) -> Result<ufv::Model, ServiceError> {
    let current = get(db, id).await?;
    let value = ufv::normalize_value(input.value)?;

    let mut am: ufv::ActiveModel = current.into();
    am.value = Set(value);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn row(date: NaiveDate, value: f64) -> ufv::Model {
        let now = Utc::now().into();
        ufv::Model {
            id: Uuid::new_v4(),
            date,
            value,
            status: status::ACTIVO.into(),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn inverted_range_is_invalid() {
        let r = UfvRange { desde: NaiveDate::from_ymd_opt(2024, 2, 1), hasta: NaiveDate::from_ymd_opt(2024, 1, 1) };
        assert!(matches!(r.validate(), Err(ServiceError::Validation(_))));
        assert!(UfvRange::default().validate().is_ok());
    }

    #[tokio::test]
    async fn value_at_returns_closest_previous_row() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(d, 2.49123)]])
            .into_connection();
        let found = value_at(&db, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()).await.unwrap();
        assert_eq!(found.date, d);
        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("ORDER BY"), "{sql}");
    }

    #[tokio::test]
    async fn value_at_without_history_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ufv::Model>::new()])
            .into_connection();
        let err = value_at(&db, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
