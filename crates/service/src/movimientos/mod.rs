//! Movements recorded against a building: ampliaciones, remodelaciones
//! and bajas.

pub mod ampliacion_service;
pub mod baja_service;
pub mod remodelacion_service;

use chrono::NaiveDate;
use models::edificio;
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::status_service;

/// `?edificio_id=` filter shared by the movement listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovimientoFilter {
    pub edificio_id: Option<Uuid>,
}

/// Building that accepts new movements: it must exist and be `ACTIVO`.
pub(crate) async fn open_edificio<C: ConnectionTrait>(db: &C, edificio_id: Uuid) -> Result<edificio::Model, ServiceError> {
    status_service::require_active::<edificio::Entity, _>(db, edificio_id).await
}

/// [`open_edificio`] holding `FOR UPDATE` on the building row until the
/// surrounding transaction ends.
pub(crate) async fn lock_open_edificio<C: ConnectionTrait>(txn: &C, edificio_id: Uuid) -> Result<edificio::Model, ServiceError> {
    edificio::Entity::find_by_id(edificio_id).lock_exclusive().one(txn).await?;
    open_edificio(txn, edificio_id).await
}

pub(crate) fn not_before_acquisition(edificio: &edificio::Model, date: NaiveDate) -> Result<(), ServiceError> {
    if date < edificio.acquisition_date {
        return Err(ServiceError::validation(format!(
            "date {date} is before the acquisition date {}",
            edificio.acquisition_date
        )));
    }
    Ok(())
}
