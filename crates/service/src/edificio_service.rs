//! Buildings, their UFV valuation and movement history.

use chrono::{NaiveDate, Utc};
use models::validation::{non_negative, normalize_code, optional_text, positive, required_text, validate_name, MAX_TEXT_LEN};
use models::{ampliacion, auxiliar, baja, edificio, nucleo, remodelacion, status, unidad_organizacional, Status};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::valuation::{self, Entry, LineKind, Valuation};
use crate::{status_service, ufv_service};

#[derive(Debug, Clone, Deserialize)]
pub struct EdificioInput {
    pub code: String,
    pub name: String,
    pub address: String,
    pub nucleo_id: Uuid,
    pub auxiliar_id: Uuid,
    pub unidad_organizacional_id: Uuid,
    pub acquisition_date: NaiveDate,
    pub acquisition_value: f64,
    #[serde(default)]
    pub land_surface_m2: f64,
    #[serde(default)]
    pub built_surface_m2: f64,
    pub floors: i32,
    #[serde(default)]
    pub deed_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdificioFilter {
    pub nucleo_id: Option<Uuid>,
    pub auxiliar_id: Option<Uuid>,
    pub unidad_organizacional_id: Option<Uuid>,
}

/// Everything recorded against one building.
#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub edificio: edificio::Model,
    pub ampliaciones: Vec<ampliacion::Model>,
    pub remodelaciones: Vec<remodelacion::Model>,
    pub bajas: Vec<baja::Model>,
    /// Own built surface plus every active ampliación.
    pub total_built_surface_m2: f64,
}

/// Row of the building export, with parent names resolved.
#[derive(Debug, Clone)]
pub struct EdificioRow {
    pub edificio: edificio::Model,
    pub nucleo: Option<String>,
    pub auxiliar: Option<String>,
    pub total_built_surface_m2: f64,
}

struct Fields {
    code: String,
    name: String,
    address: String,
    acquisition_value: f64,
    land_surface_m2: f64,
    built_surface_m2: f64,
    floors: i32,
    deed_number: Option<String>,
    notes: Option<String>,
}

impl EdificioInput {
    fn clean(&self) -> Result<Fields, ServiceError> {
        Ok(Fields {
            code: normalize_code(&self.code)?,
            name: validate_name(&self.name)?,
            address: required_text("address", &self.address, 255)?,
            acquisition_value: positive("acquisition_value", self.acquisition_value)?,
            land_surface_m2: non_negative("land_surface_m2", self.land_surface_m2)?,
            built_surface_m2: non_negative("built_surface_m2", self.built_surface_m2)?,
            floors: edificio::validate_floors(self.floors)?,
            deed_number: optional_text("deed_number", self.deed_number.as_deref(), 64)?,
            notes: optional_text("notes", self.notes.as_deref(), MAX_TEXT_LEN)?,
        })
    }
}

fn filtered(params: &ListParams, filter: &EdificioFilter) -> Result<Select<edificio::Entity>, ServiceError> {
    let mut q = with_status(edificio::Entity::find(), params)?;
    if let Some(id) = filter.nucleo_id {
        q = q.filter(edificio::Column::NucleoId.eq(id));
    }
    if let Some(id) = filter.auxiliar_id {
        q = q.filter(edificio::Column::AuxiliarId.eq(id));
    }
    if let Some(id) = filter.unidad_organizacional_id {
        q = q.filter(edificio::Column::UnidadOrganizacionalId.eq(id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[edificio::Column::Code, edificio::Column::Name, edificio::Column::Address], &term));
    }
    Ok(q.order_by_asc(edificio::Column::Code))
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &EdificioFilter) -> Result<Page<edificio::Model>, ServiceError> {
    fetch_page(filtered(params, filter)?, db, params.pagination()).await
}

/// Unpaged rows for the PDF export.
pub async fn list_all(db: &DatabaseConnection, params: &ListParams, filter: &EdificioFilter) -> Result<Vec<EdificioRow>, ServiceError> {
    let rows = filtered(params, filter)?.find_also_related(nucleo::Entity).all(db).await?;
    let auxiliares = auxiliar::Entity::find().all(db).await?;
    let extensions = ampliacion::Entity::find()
        .filter(ampliacion::Column::Status.eq(status::ACTIVO))
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(e, n)| {
            let added: f64 = extensions.iter().filter(|a| a.edificio_id == e.id).map(|a| a.added_surface_m2).sum();
            EdificioRow {
                nucleo: n.map(|n| n.name),
                auxiliar: auxiliares.iter().find(|a| a.id == e.auxiliar_id).map(|a| format!("{} {}", a.code, a.name)),
                total_built_surface_m2: valuation::round2(e.built_surface_m2 + added),
                edificio: e,
            }
        })
        .collect())
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<edificio::Model, ServiceError> {
    status_service::find::<edificio::Entity, _>(db, id).await
}

pub async fn active_baja<C: ConnectionTrait>(db: &C, edificio_id: Uuid) -> Result<Option<baja::Model>, ServiceError> {
    Ok(baja::Entity::find()
        .filter(baja::Column::EdificioId.eq(edificio_id))
        .filter(baja::Column::Status.eq(status::ACTIVO))
        .one(db)
        .await?)
}

async fn ensure_no_baja<C: ConnectionTrait>(db: &C, edificio_id: Uuid) -> Result<(), ServiceError> {
    if active_baja(db, edificio_id).await?.is_some() {
        return Err(ServiceError::Conflict("edificio has an active baja".into()));
    }
    Ok(())
}

async fn check_refs(db: &DatabaseConnection, input: &EdificioInput) -> Result<(), ServiceError> {
    status_service::require_active::<nucleo::Entity, _>(db, input.nucleo_id).await?;
    status_service::require_active::<auxiliar::Entity, _>(db, input.auxiliar_id).await?;
    status_service::require_active::<unidad_organizacional::Entity, _>(db, input.unidad_organizacional_id).await?;
    Ok(())
}

#[instrument(skip(db, input), fields(code = %input.code))]
pub async fn create(db: &DatabaseConnection, actor: Uuid, input: EdificioInput) -> Result<edificio::Model, ServiceError> {
    let f = input.clean()?;
    check_refs(db, &input).await?;
    ensure_unique::<edificio::Entity, _, _>(db, edificio::Column::Code, "code", f.code.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = edificio::ActiveModel {
        id: Set(id),
        code: Set(f.code),
        name: Set(f.name),
        address: Set(f.address),
        nucleo_id: Set(input.nucleo_id),
        auxiliar_id: Set(input.auxiliar_id),
        unidad_organizacional_id: Set(input.unidad_organizacional_id),
        acquisition_date: Set(input.acquisition_date),
        acquisition_value: Set(f.acquisition_value),
        land_surface_m2: Set(f.land_surface_m2),
        built_surface_m2: Set(f.built_surface_m2),
        floors: Set(f.floors),
        deed_number: Set(f.deed_number),
        notes: Set(f.notes),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

#[instrument(skip(db, input))]
pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: EdificioInput) -> Result<edificio::Model, ServiceError> {
    let current = get(db, id).await?;
    ensure_no_baja(db, id).await?;
    let f = input.clean()?;
    check_refs(db, &input).await?;
    if f.code != current.code {
        ensure_unique::<edificio::Entity, _, _>(db, edificio::Column::Code, "code", f.code.clone(), Some(id)).await?;
    }
    if input.acquisition_date > current.acquisition_date {
        let earlier = ampliacion::Entity::find()
            .filter(ampliacion::Column::EdificioId.eq(id))
            .filter(ampliacion::Column::Status.eq(status::ACTIVO))
            .filter(ampliacion::Column::Date.lt(input.acquisition_date))
            .one(db)
            .await?;
        if earlier.is_some() {
            return Err(ServiceError::validation("acquisition_date is after an existing ampliacion"));
        }
    }

    let mut am: edificio::ActiveModel = current.into();
    am.code = Set(f.code);
    am.name = Set(f.name);
    am.address = Set(f.address);
    am.nucleo_id = Set(input.nucleo_id);
    am.auxiliar_id = Set(input.auxiliar_id);
    am.unidad_organizacional_id = Set(input.unidad_organizacional_id);
    am.acquisition_date = Set(input.acquisition_date);
    am.acquisition_value = Set(f.acquisition_value);
    am.land_surface_m2 = Set(f.land_surface_m2);
    am.built_surface_m2 = Set(f.built_surface_m2);
    am.floors = Set(f.floors);
    am.deed_number = Set(f.deed_number);
    am.notes = Set(f.notes);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

/// A decommissioned building only changes state through its baja.
pub async fn toggle(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<Status, ServiceError> {
    get(db, id).await?;
    ensure_no_baja(db, id).await?;
    status_service::toggle::<edificio::Entity>(db, actor, id).await
}

pub async fn delete(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    get(db, id).await?;
    ensure_no_baja(db, id).await?;
    status_service::soft_delete::<edificio::Entity>(db, actor, id).await
}

pub async fn history(db: &DatabaseConnection, id: Uuid) -> Result<History, ServiceError> {
    let edificio = get(db, id).await?;
    let ampliaciones = ampliacion::Entity::find()
        .filter(ampliacion::Column::EdificioId.eq(id))
        .order_by_asc(ampliacion::Column::Date)
        .all(db)
        .await?;
    let remodelaciones = remodelacion::Entity::find()
        .filter(remodelacion::Column::EdificioId.eq(id))
        .order_by_asc(remodelacion::Column::Date)
        .all(db)
        .await?;
    let bajas = baja::Entity::find()
        .filter(baja::Column::EdificioId.eq(id))
        .order_by_desc(baja::Column::Date)
        .all(db)
        .await?;
    let added: f64 = ampliaciones
        .iter()
        .filter(|a| Status::is_active(&a.status))
        .map(|a| a.added_surface_m2)
        .sum();
    Ok(History {
        total_built_surface_m2: valuation::round2(edificio.built_surface_m2 + added),
        edificio,
        ampliaciones,
        remodelaciones,
        bajas,
    })
}

/// Acquisition plus active movements restated to the UFV of `date`
/// (today when absent).
#[instrument(skip(db))]
pub async fn valuation(db: &DatabaseConnection, id: Uuid, date: Option<NaiveDate>) -> Result<Valuation, ServiceError> {
    let edificio = get(db, id).await?;
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    if date < edificio.acquisition_date {
        return Err(ServiceError::validation("valuation date is before the acquisition date"));
    }
    let target = ufv_service::value_at(db, date).await?;

    let mut entries = vec![Entry {
        kind: LineKind::Adquisicion,
        source_id: edificio.id,
        date: edificio.acquisition_date,
        value: edificio.acquisition_value,
        ufv_origin: ufv_service::value_at(db, edificio.acquisition_date).await?.value,
    }];

    let ampliaciones = ampliacion::Entity::find()
        .filter(ampliacion::Column::EdificioId.eq(id))
        .filter(ampliacion::Column::Status.eq(status::ACTIVO))
        .filter(ampliacion::Column::Date.lte(date))
        .order_by_asc(ampliacion::Column::Date)
        .all(db)
        .await?;
    for a in ampliaciones {
        entries.push(Entry {
            kind: LineKind::Ampliacion,
            source_id: a.id,
            date: a.date,
            value: a.value,
            ufv_origin: ufv_service::value_at(db, a.date).await?.value,
        });
    }

    let remodelaciones = remodelacion::Entity::find()
        .filter(remodelacion::Column::EdificioId.eq(id))
        .filter(remodelacion::Column::Status.eq(status::ACTIVO))
        .filter(remodelacion::Column::Date.lte(date))
        .order_by_asc(remodelacion::Column::Date)
        .all(db)
        .await?;
    for r in remodelaciones {
        entries.push(Entry {
            kind: LineKind::Remodelacion,
            source_id: r.id,
            date: r.date,
            value: r.value,
            ufv_origin: ufv_service::value_at(db, r.date).await?.value,
        });
    }

    Ok(valuation::build(edificio.id, date, target.date, target.value, &entries))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::contabilidad::auxiliar_service::{self, AuxiliarInput};
    use crate::contabilidad::grupo_contable_service::{self, GrupoContableInput};
    use crate::estructura::unidad_service::{self, UnidadInput};
    use crate::geografia::ciudad_service::{self, CiudadInput};
    use crate::geografia::distrito_service::{self, DistritoInput};
    use crate::geografia::nucleo_service::{self, NucleoInput};
    use crate::test_support::{db_or_skip, unique};
    use crate::ufv_service::UfvInput;

    pub(crate) fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Fresh building with all of its parents, acquired on 1900-01-02.
    pub(crate) async fn seed_edificio(db: &DatabaseConnection, actor: Uuid) -> Result<edificio::Model, anyhow::Error> {
        let ciudad = ciudad_service::create(db, actor, CiudadInput { code: unique("C"), name: "La Paz".into() }).await?;
        let distrito = distrito_service::create(
            db,
            actor,
            DistritoInput { ciudad_id: ciudad.id, code: unique("D"), name: "Centro".into() },
        )
        .await?;
        let nucleo = nucleo_service::create(
            db,
            actor,
            NucleoInput { distrito_id: distrito.id, code: unique("N"), name: "Nucleo 1".into(), address: None },
        )
        .await?;
        let unidad = unidad_service::create(
            db,
            actor,
            UnidadInput { code: unique("U"), name: "Administracion".into(), acronym: Some("adm".into()) },
        )
        .await?;
        let grupo = grupo_contable_service::create(
            db,
            actor,
            GrupoContableInput { name: unique("Edificios "), useful_life_years: 40, depreciation_rate: 2.5 },
        )
        .await?;
        let aux = auxiliar_service::create(db, actor, AuxiliarInput { grupo_contable_id: grupo.id, name: "Oficinas".into() }).await?;

        Ok(create(
            db,
            actor,
            EdificioInput {
                code: unique("E"),
                name: "Edificio Central".into(),
                address: "Av. Camacho 1234".into(),
                nucleo_id: nucleo.id,
                auxiliar_id: aux.id,
                unidad_organizacional_id: unidad.id,
                acquisition_date: day(1900, 1, 2),
                acquisition_value: 1000.0,
                land_surface_m2: 500.0,
                built_surface_m2: 1200.0,
                floors: 4,
                deed_number: Some("  ".into()),
                notes: None,
            },
        )
        .await?)
    }

    /// UFV rows on fixed dates far in the past so they never collide with
    /// real data; duplicates from earlier runs are fine.
    pub(crate) async fn seed_ufv(db: &DatabaseConnection, actor: Uuid, date: NaiveDate, value: f64) -> Result<(), anyhow::Error> {
        match ufv_service::create(db, actor, UfvInput { date, value }).await {
            Ok(_) | Err(ServiceError::Duplicate(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[tokio::test]
    async fn create_validates_and_stores_building() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let e = seed_edificio(&db, actor).await?;
        assert_eq!(e.status, status::ACTIVO);
        assert_eq!(e.deed_number, None);

        let mut again = EdificioInput {
            code: e.code.to_lowercase(),
            name: "Otro".into(),
            address: "Calle 1".into(),
            nucleo_id: e.nucleo_id,
            auxiliar_id: e.auxiliar_id,
            unidad_organizacional_id: e.unidad_organizacional_id,
            acquisition_date: day(2000, 1, 1),
            acquisition_value: 10.0,
            land_surface_m2: 0.0,
            built_surface_m2: 0.0,
            floors: 1,
            deed_number: None,
            notes: None,
        };
        assert!(matches!(create(&db, actor, again.clone()).await, Err(ServiceError::Duplicate(_))));

        again.code = unique("E");
        again.floors = 0;
        assert!(matches!(create(&db, actor, again.clone()).await, Err(ServiceError::Model(_))));

        again.floors = 1;
        again.nucleo_id = Uuid::new_v4();
        assert!(matches!(create(&db, actor, again).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn valuation_restates_acquisition() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        seed_ufv(&db, actor, day(1900, 1, 1), 1.0).await?;
        seed_ufv(&db, actor, day(1900, 6, 1), 1.5).await?;
        let e = seed_edificio(&db, actor).await?;

        let v = valuation(&db, e.id, Some(day(1900, 7, 1))).await?;
        assert_eq!(v.ufv_date, day(1900, 6, 1));
        assert_eq!(v.lines.len(), 1);
        assert_eq!(v.lines[0].kind, LineKind::Adquisicion);
        assert_eq!(v.total_adjusted, 1500.0);

        let early = valuation(&db, e.id, Some(day(1899, 12, 31))).await;
        assert!(matches!(early, Err(ServiceError::Validation(_))));
        Ok(())
    }

    fn copy_of(e: &edificio::Model) -> EdificioInput {
        EdificioInput {
            code: unique("E"),
            name: e.name.clone(),
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
        }
    }

    #[tokio::test]
    async fn oversized_text_is_a_validation_error() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let e = seed_edificio(&db, actor).await?;

        let long_address = EdificioInput { address: "A".repeat(300), ..copy_of(&e) };
        assert!(matches!(create(&db, actor, long_address).await, Err(ServiceError::Model(_))));

        let long_deed = EdificioInput { deed_number: Some("9".repeat(65)), ..copy_of(&e) };
        assert!(matches!(update(&db, actor, e.id, long_deed).await, Err(ServiceError::Model(_))));

        let fits = EdificioInput { address: "A".repeat(255), deed_number: Some("9".repeat(64)), ..copy_of(&e) };
        assert_eq!(create(&db, actor, fits).await?.address.len(), 255);
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_parent() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let first = seed_edificio(&db, actor).await?;
        let second = seed_edificio(&db, actor).await?;
        let params = ListParams::default();

        let by_nucleo = list(&db, &params, &EdificioFilter { nucleo_id: Some(first.nucleo_id), ..Default::default() }).await?;
        assert_eq!(by_nucleo.items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![first.id]);

        let by_auxiliar = list(&db, &params, &EdificioFilter { auxiliar_id: Some(second.auxiliar_id), ..Default::default() }).await?;
        assert_eq!(by_auxiliar.items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![second.id]);

        let by_unidad = EdificioFilter { unidad_organizacional_id: Some(first.unidad_organizacional_id), ..Default::default() };
        assert_eq!(list(&db, &params, &by_unidad).await?.total, 1);

        // filters combine with AND
        let mixed = EdificioFilter { nucleo_id: Some(first.nucleo_id), auxiliar_id: Some(second.auxiliar_id), ..Default::default() };
        assert_eq!(list(&db, &params, &mixed).await?.total, 0);
        Ok(())
    }
}
