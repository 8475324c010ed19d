//! Decommission of buildings.
//!
//! Registering a baja and flipping its building to `INACTIVO` happen in
//! one transaction; annulling reverses both.

use chrono::{NaiveDate, Utc};
use models::validation::{required_text, MAX_TEXT_LEN};
use models::{baja, edificio, status, Status};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{lock_open_edificio, not_before_acquisition, MovimientoFilter};
use crate::audit_service::{self, AuditAction};
use crate::edificio_service;
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct BajaInput {
    pub edificio_id: Uuid,
    pub date: NaiveDate,
    pub reason: String,
    pub resolution: String,
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &MovimientoFilter) -> Result<Page<baja::Model>, ServiceError> {
    let mut q = with_status(baja::Entity::find(), params)?;
    if let Some(id) = filter.edificio_id {
        q = q.filter(baja::Column::EdificioId.eq(id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[baja::Column::Reason, baja::Column::Resolution], &term));
    }
    fetch_page(q.order_by_desc(baja::Column::Date), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<baja::Model, ServiceError> {
    status_service::find::<baja::Entity, _>(db, id).await
}

#[instrument(skip(db, input), fields(edificio_id = %input.edificio_id))]
pub async fn register(db: &DatabaseConnection, actor: Uuid, input: BajaInput) -> Result<baja::Model, ServiceError> {
    let reason = required_text("reason", &input.reason, MAX_TEXT_LEN)?;
    let resolution = required_text("resolution", &input.resolution, 64)?;

    let already_retired = || ServiceError::Conflict("edificio already has an active baja".into());

    let txn = db.begin().await?;
    let edificio = lock_open_edificio(&txn, input.edificio_id).await?;
    if edificio_service::active_baja(&txn, edificio.id).await?.is_some() {
        return Err(already_retired());
    }
    not_before_acquisition(&edificio, input.date)?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let saved = baja::ActiveModel {
        id: Set(id),
        edificio_id: Set(edificio.id),
        date: Set(input.date),
        reason: Set(reason),
        resolution: Set(resolution),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(|e| match ServiceError::from(e) {
        // uq_baja_edificio_activo
        ServiceError::Duplicate(_) => already_retired(),
        other => other,
    })?;
    status_service::write::<edificio::Entity, _>(&txn, Some(actor), edificio.id, Status::Inactivo).await?;
    audit_service::record(&txn, Some(actor), AuditAction::Baja, "edificio", Some(edificio.id), audit_service::snapshot(&saved)).await?;
    txn.commit().await?;

    info!(%id, edificio = %edificio.code, %actor, "baja_registered");
    Ok(saved)
}

/// Annul an active baja and bring its building back to `ACTIVO`.
#[instrument(skip(db))]
pub async fn annul(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<baja::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = baja::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("baja"))?;
    if !Status::is_active(&current.status) {
        return Err(ServiceError::Conflict("baja is already annulled".into()));
    }
    let edificio_id = current.edificio_id;

    let mut am: baja::ActiveModel = current.into();
    am.status = Set(status::INACTIVO.into());
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    let saved = am.update(&txn).await?;
    status_service::write::<edificio::Entity, _>(&txn, Some(actor), edificio_id, Status::Activo).await?;
    audit_service::record(&txn, Some(actor), AuditAction::Anular, "edificio", Some(edificio_id), audit_service::snapshot(&saved)).await?;
    txn.commit().await?;

    info!(%id, %edificio_id, %actor, "baja_annulled");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edificio_service::tests::{day, seed_edificio};
    use crate::edificio_service::{self, EdificioInput};
    use crate::test_support::db_or_skip;

    fn input(edificio_id: Uuid) -> BajaInput {
        BajaInput {
            edificio_id,
            date: day(1950, 5, 20),
            reason: "Demolicion".into(),
            resolution: "RA-001/1950".into(),
        }
    }

    #[tokio::test]
    async fn baja_blocks_building_until_annulled() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let e = seed_edificio(&db, actor).await?;

        let b = register(&db, actor, input(e.id)).await?;
        assert_eq!(edificio_service::get(&db, e.id).await?.status, status::INACTIVO);

        // building is INACTIVO now, so a second baja fails on the reference check
        assert!(register(&db, actor, input(e.id)).await.is_err());
        assert!(matches!(edificio_service::toggle(&db, actor, e.id).await, Err(ServiceError::Conflict(_))));
        let edit = EdificioInput {
            code: e.code.clone(),
            name: "Renombrado".into(),
            address: e.address.clone(),
            nucleo_id: e.nucleo_id,
            auxiliar_id: e.auxiliar_id,
            unidad_organizacional_id: e.unidad_organizacional_id,
            acquisition_date: e.acquisition_date,
            acquisition_value: e.acquisition_value,
            land_surface_m2: e.land_surface_m2,
            built_surface_m2: e.built_surface_m2,
            floors: e.floors,
            deed_number: None,
            notes: None,
        };
        assert!(matches!(edificio_service::update(&db, actor, e.id, edit).await, Err(ServiceError::Conflict(_))));

        let annulled = annul(&db, actor, b.id).await?;
        assert_eq!(annulled.status, status::INACTIVO);
        assert_eq!(edificio_service::get(&db, e.id).await?.status, status::ACTIVO);
        assert!(matches!(annul(&db, actor, b.id).await, Err(ServiceError::Conflict(_))));

        let history = edificio_service::history(&db, e.id).await?;
        assert_eq!(history.bajas.len(), 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_leave_one_active_baja() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let spawn_register = |edificio_id: Uuid| {
            let db = db.clone();
            tokio::spawn(async move { register(&db, actor, input(edificio_id)).await })
        };
        for _ in 0..5 {
            let e = seed_edificio(&db, actor).await?;
            let (a, b) = tokio::join!(spawn_register(e.id), spawn_register(e.id));
            let results = [a?, b?];
            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1, "{results:?}");
            for r in &results {
                if let Err(err) = r {
                    assert!(matches!(err, ServiceError::Validation(_) | ServiceError::Conflict(_)), "{err:?}");
                }
            }

            let active = baja::Entity::find()
                .filter(baja::Column::EdificioId.eq(e.id))
                .filter(baja::Column::Status.eq(status::ACTIVO))
                .all(&db)
                .await?;
            assert_eq!(active.len(), 1);
            assert_eq!(edificio_service::get(&db, e.id).await?.status, status::INACTIVO);
        }
        Ok(())
    }

    #[tokio::test]
    async fn baja_before_acquisition_is_rejected() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let e = seed_edificio(&db, actor).await?;
        let early = BajaInput { date: day(1899, 1, 1), ..input(e.id) };
        assert!(matches!(register(&db, actor, early).await, Err(ServiceError::Validation(_))));
        assert_eq!(edificio_service::get(&db, e.id).await?.status, status::ACTIVO);
        Ok(())
    }
}
