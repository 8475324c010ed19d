//! Personnel registry keyed by cédula de identidad.

use chrono::Utc;
use models::personal::normalize_ci;
use models::validation::{optional_text, required_text, validate_email};
use models::{cargo, personal, status};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct PersonalInput {
    pub cargo_id: Uuid,
    pub ci: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalFilter {
    pub cargo_id: Option<Uuid>,
}

fn filtered(params: &ListParams, filter: &PersonalFilter) -> Result<Select<personal::Entity>, ServiceError> {
    let mut q = with_status(personal::Entity::find(), params)?;
    if let Some(cargo_id) = filter.cargo_id {
        q = q.filter(personal::Column::CargoId.eq(cargo_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(
            &[personal::Column::Ci, personal::Column::FirstName, personal::Column::LastName],
            &term,
        ));
    }
    Ok(q.order_by_asc(personal::Column::LastName).order_by_asc(personal::Column::FirstName))
}

pub async fn list(db: &DatabaseConnection, params: &ListParams, filter: &PersonalFilter) -> Result<Page<personal::Model>, ServiceError> {
    fetch_page(filtered(params, filter)?, db, params.pagination()).await
}

pub async fn list_all(db: &DatabaseConnection, params: &ListParams, filter: &PersonalFilter) -> Result<Vec<(personal::Model, Option<cargo::Model>)>, ServiceError> {
    Ok(filtered(params, filter)?.find_also_related(cargo::Entity).all(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<personal::Model, ServiceError> {
    status_service::find::<personal::Entity, _>(db, id).await
}

struct Clean {
    ci: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
}

fn clean(input: &PersonalInput) -> Result<Clean, ServiceError> {
    Ok(Clean {
        ci: normalize_ci(&input.ci)?,
        first_name: required_text("first_name", &input.first_name, 128)?,
        last_name: required_text("last_name", &input.last_name, 128)?,
        email: validate_email(input.email.as_deref())?,
        phone: optional_text("phone", input.phone.as_deref(), 32)?,
    })
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: PersonalInput) -> Result<personal::Model, ServiceError> {
    let c = clean(&input)?;
    status_service::require_active::<cargo::Entity, _>(db, input.cargo_id).await?;
    ensure_unique::<personal::Entity, _, _>(db, personal::Column::Ci, "ci", c.ci.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = personal::ActiveModel {
        id: Set(id),
        cargo_id: Set(input.cargo_id),
        ci: Set(c.ci),
        first_name: Set(c.first_name),
        last_name: Set(c.last_name),
        email: Set(c.email),
        phone: Set(c.phone),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: PersonalInput) -> Result<personal::Model, ServiceError> {
    let current = get(db, id).await?;
    let c = clean(&input)?;
    if input.cargo_id != current.cargo_id {
        status_service::require_active::<cargo::Entity, _>(db, input.cargo_id).await?;
    }
    if c.ci != current.ci {
        ensure_unique::<personal::Entity, _, _>(db, personal::Column::Ci, "ci", c.ci.clone(), Some(id)).await?;
    }

    let mut am: personal::ActiveModel = current.into();
    am.cargo_id = Set(input.cargo_id);
    am.ci = Set(c.ci);
    am.first_name = Set(c.first_name);
    am.last_name = Set(c.last_name);
    am.email = Set(c.email);
    am.phone = Set(c.phone);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estructura::cargo_service::tests::seed_cargo;
    use crate::test_support::db_or_skip;

    fn input(ci: &str, email: Option<&str>) -> PersonalInput {
        PersonalInput {
            cargo_id: Uuid::new_v4(),
            ci: ci.into(),
            first_name: " Ana ".into(),
            last_name: "Quispe".into(),
            email: email.map(str::to_string),
            phone: Some("  ".into()),
        }
    }

    #[test]
    fn clean_normalizes_fields() {
        let c = clean(&input("4789123 lp", Some("Ana.Quispe@Gob.bo"))).unwrap();
        assert_eq!(c.ci, "4789123 LP");
        assert_eq!(c.first_name, "Ana");
        assert_eq!(c.email.as_deref(), Some("ana.quispe@gob.bo"));
        assert_eq!(c.phone, None);
    }

    #[test]
    fn clean_rejects_bad_ci_and_email() {
        assert!(matches!(clean(&input("12", None)), Err(ServiceError::Model(_))));
        assert!(matches!(clean(&input("4789123", Some("ana@"))), Err(ServiceError::Model(_))));
    }

    fn unique_ci() -> String {
        format!("{:010}", Uuid::new_v4().as_u128() % 10_000_000_000)
    }

    #[test]
    fn clean_enforces_column_widths() {
        let mut long_name = input("4789123", None);
        long_name.first_name = "A".repeat(129);
        assert!(matches!(clean(&long_name), Err(ServiceError::Model(_))));

        let mut long_phone = input("4789123", None);
        long_phone.phone = Some("7".repeat(33));
        assert!(matches!(clean(&long_phone), Err(ServiceError::Model(_))));

        let mut max = input("4789123", None);
        max.last_name = "Q".repeat(128);
        assert!(clean(&max).is_ok());
    }

    #[tokio::test]
    async fn personal_ci_is_unique_and_filtered_by_cargo() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let k = seed_cargo(&db, actor).await?;

        let ci = unique_ci();
        let p = create(&db, actor, PersonalInput { cargo_id: k.id, ..input(&ci, Some("ana@gob.bo")) }).await?;
        assert_eq!(p.ci, ci);
        assert_eq!(p.first_name, "Ana");

        let dup = create(&db, actor, PersonalInput { cargo_id: k.id, ..input(&ci, None) }).await;
        assert!(matches!(dup, Err(ServiceError::Duplicate(_))));

        let orphan = create(&db, actor, input(&unique_ci(), None)).await;
        assert!(matches!(orphan, Err(ServiceError::NotFound(_))));

        let page = list(&db, &ListParams::default(), &PersonalFilter { cargo_id: Some(k.id) }).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, p.id);
        Ok(())
    }
}
