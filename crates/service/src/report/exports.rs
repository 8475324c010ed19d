//! Report tables behind the `/exportar/pdf` endpoints.

use models::{ambiente, area, auxiliar, cargo, grupo_contable, personal, ufv};
use sea_orm::DatabaseConnection;

use super::ReportTable;
use crate::contabilidad::auxiliar_service::{self, AuxiliarFilter};
use crate::edificio_service::{self, EdificioFilter, EdificioRow};
use crate::errors::ServiceError;
use crate::estructura::ambiente_service::{self, AmbienteFilter};
use crate::pagination::ListParams;
use crate::personal_service::{self, PersonalFilter};
use crate::ufv_service::{self, UfvRange};

fn money(v: f64) -> String {
    format!("{v:.2}")
}

fn opt(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

pub fn edificios_table(rows: &[EdificioRow]) -> ReportTable {
    let mut t = ReportTable::new(
        "Edificios",
        &["Código", "Nombre", "Dirección", "Núcleo", "Auxiliar", "Adquisición", "Valor", "Sup. terreno m²", "Sup. construida m²", "Pisos", "Estado"],
    );
    for r in rows {
        let e = &r.edificio;
        t.push(vec![
            e.code.clone(),
            e.name.clone(),
            e.address.clone(),
            opt(&r.nucleo),
            opt(&r.auxiliar),
            e.acquisition_date.format("%d/%m/%Y").to_string(),
            money(e.acquisition_value),
            money(e.land_surface_m2),
            money(r.total_built_surface_m2),
            e.floors.to_string(),
            e.status.clone(),
        ]);
    }
    t
}

pub fn personal_table(rows: &[(personal::Model, Option<cargo::Model>)]) -> ReportTable {
    let mut t = ReportTable::new("Personal", &["CI", "Nombre completo", "Cargo", "Email", "Teléfono", "Estado"]);
    for (p, c) in rows {
        t.push(vec![
            p.ci.clone(),
            p.full_name(),
            c.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            opt(&p.email),
            opt(&p.phone),
            p.status.clone(),
        ]);
    }
    t
}

pub fn ambientes_table(rows: &[(ambiente::Model, Option<area::Model>)]) -> ReportTable {
    let mut t = ReportTable::new("Ambientes", &["Código", "Nombre", "Área", "Piso", "Descripción", "Estado"]);
    for (a, area) in rows {
        t.push(vec![
            a.code.clone(),
            a.name.clone(),
            area.as_ref().map(|x| x.name.clone()).unwrap_or_default(),
            opt(&a.floor),
            opt(&a.description),
            a.status.clone(),
        ]);
    }
    t
}

pub fn auxiliares_table(rows: &[(auxiliar::Model, Option<grupo_contable::Model>)]) -> ReportTable {
    let mut t = ReportTable::new("Auxiliares contables", &["Código", "Nombre", "Grupo contable", "Vida útil (años)", "Estado"]);
    for (a, g) in rows {
        t.push(vec![
            a.code.clone(),
            a.name.clone(),
            g.as_ref().map(|g| format!("{} {}", g.code, g.name)).unwrap_or_default(),
            g.as_ref().map(|g| g.useful_life_years.to_string()).unwrap_or_default(),
            a.status.clone(),
        ]);
    }
    t
}

pub fn ufvs_table(rows: &[ufv::Model], range: &UfvRange) -> ReportTable {
    let mut t = ReportTable::new("Unidad de Fomento a la Vivienda", &["Fecha", "Valor", "Estado"]);
    let fmt = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%d/%m/%Y").to_string());
    match (fmt(range.desde), fmt(range.hasta)) {
        (Some(d), Some(h)) => t = t.with_subtitle(format!("Del {d} al {h}")),
        (Some(d), None) => t = t.with_subtitle(format!("Desde {d}")),
        (None, Some(h)) => t = t.with_subtitle(format!("Hasta {h}")),
        (None, None) => {}
    }
    for u in rows {
        t.push(vec![u.date.format("%d/%m/%Y").to_string(), format!("{:.5}", u.value), u.status.clone()]);
    }
    t
}

pub async fn edificios_report(db: &DatabaseConnection, params: &ListParams, filter: &EdificioFilter) -> Result<ReportTable, ServiceError> {
    Ok(edificios_table(&edificio_service::list_all(db, params, filter).await?))
}

pub async fn personal_report(db: &DatabaseConnection, params: &ListParams, filter: &PersonalFilter) -> Result<ReportTable, ServiceError> {
    Ok(personal_table(&personal_service::list_all(db, params, filter).await?))
}

pub async fn ambientes_report(db: &DatabaseConnection, params: &ListParams, filter: &AmbienteFilter) -> Result<ReportTable, ServiceError> {
    Ok(ambientes_table(&ambiente_service::list_all(db, params, filter).await?))
}

pub async fn auxiliares_report(db: &DatabaseConnection, params: &ListParams, filter: &AuxiliarFilter) -> Result<ReportTable, ServiceError> {
    Ok(auxiliares_table(&auxiliar_service::list_all(db, params, filter).await?))
}

pub async fn ufvs_report(db: &DatabaseConnection, params: &ListParams, range: &UfvRange) -> Result<ReportTable, ServiceError> {
    Ok(ufvs_table(&ufv_service::list_all(db, params, range).await?, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use models::status;
    use uuid::Uuid;

    #[test]
    fn ufv_table_formats_five_decimals_and_range() {
        let now = Utc::now().into();
        let rows = vec![ufv::Model {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            value: 2.4612,
            status: status::ACTIVO.into(),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }];
        let range = UfvRange { desde: NaiveDate::from_ymd_opt(2024, 1, 1), hasta: None };
        let t = ufvs_table(&rows, &range);
        assert_eq!(t.subtitle.as_deref(), Some("Desde 01/01/2024"));
        assert_eq!(t.rows[0], vec!["02/01/2024", "2.46120", "ACTIVO"]);
    }

    #[test]
    fn personal_table_uses_cargo_name() {
        let now = Utc::now().into();
        let p = personal::Model {
            id: Uuid::new_v4(),
            cargo_id: Uuid::new_v4(),
            ci: "1234567 LP".into(),
            first_name: "Ana".into(),
            last_name: "Quispe".into(),
            email: None,
            phone: Some("70000000".into()),
            status: status::ACTIVO.into(),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        let t = personal_table(&[(p, None)]);
        assert_eq!(t.rows[0][1], "Ana Quispe");
        assert_eq!(t.rows[0][2], "");
        assert_eq!(t.rows[0][4], "70000000");
    }
}
