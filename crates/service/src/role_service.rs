//! Roles and the permissions granted to them.

use std::collections::BTreeSet;

use chrono::Utc;
use models::validation::optional_text;
use models::{permission, role, role_permission, status, SoftState, Status};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::audit_service::{self, AuditAction};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, insert_audited, update_audited};
use crate::rbac::{self, ADMIN_ROLE};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct RoleInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionsInput {
    pub permissions: Vec<String>,
}

pub async fn list_permissions(db: &DatabaseConnection) -> Result<Vec<permission::Model>, ServiceError> {
    Ok(permission::Entity::find()
        .order_by_asc(permission::Column::Module)
        .order_by_asc(permission::Column::Code)
        .all(db)
        .await?)
}

/// Permission codes held by `role_id`, sorted.
pub async fn permission_codes<C: ConnectionTrait>(db: &C, role_id: Uuid) -> Result<Vec<String>, ServiceError> {
    let rows = role_permission::Entity::find()
        .filter(role_permission::Column::RoleId.eq(role_id))
        .find_also_related(permission::Entity)
        .all(db)
        .await?;
    let codes: BTreeSet<String> = rows.into_iter().filter_map(|(_, p)| p.map(|p| p.code)).collect();
    Ok(codes.into_iter().collect())
}

pub async fn list(db: &DatabaseConnection, params: &ListParams) -> Result<Page<role::Model>, ServiceError> {
    let mut q = with_status(role::Entity::find(), params)?;
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[role::Column::Name], &term));
    }
    fetch_page(q.order_by_asc(role::Column::Name), db, params.pagination()).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<role::Model, ServiceError> {
    status_service::find::<role::Entity, _>(db, id).await
}

pub async fn create(db: &DatabaseConnection, actor: Uuid, input: RoleInput) -> Result<role::Model, ServiceError> {
    let name = role::normalize_name(&input.name)?;
    ensure_unique::<role::Entity, _, _>(db, role::Column::Name, "name", name.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let am = role::ActiveModel {
        id: Set(id),
        name: Set(name),
        description: Set(optional_text("description", input.description.as_deref(), 255)?),
        status: Set(status::ACTIVO.into()),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    insert_audited(db, actor, id, am).await
}

pub async fn update(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: RoleInput) -> Result<role::Model, ServiceError> {
    let current = get(db, id).await?;
    let name = role::normalize_name(&input.name)?;
    if name != current.name {
        if current.name == ADMIN_ROLE {
            return Err(ServiceError::Conflict(format!("role {ADMIN_ROLE} cannot be renamed")));
        }
        ensure_unique::<role::Entity, _, _>(db, role::Column::Name, "name", name.clone(), Some(id)).await?;
    }

    let mut am: role::ActiveModel = current.into();
    am.name = Set(name);
    am.description = Set(optional_text("description", input.description.as_deref(), 255)?);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

async fn ensure_not_admin(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    if get(db, id).await?.name == ADMIN_ROLE {
        return Err(ServiceError::Conflict(format!("role {ADMIN_ROLE} cannot be deactivated")));
    }
    Ok(())
}

pub async fn toggle(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<Status, ServiceError> {
    ensure_not_admin(db, id).await?;
    status_service::toggle::<role::Entity>(db, actor, id).await
}

pub async fn delete(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    ensure_not_admin(db, id).await?;
    status_service::soft_delete::<role::Entity>(db, actor, id).await
}

pub async fn get_role_permissions(db: &DatabaseConnection, role_id: Uuid) -> Result<Vec<String>, ServiceError> {
    get(db, role_id).await?;
    permission_codes(db, role_id).await
}

/// Trimmed, deduplicated, all present in the catalog.
fn clean_codes(codes: &[String]) -> Result<BTreeSet<String>, ServiceError> {
    let mut out = BTreeSet::new();
    for c in codes {
        let code = c.trim().to_ascii_lowercase();
        if !rbac::is_known(&code) {
            return Err(ServiceError::validation(format!("unknown permission '{}'", c.trim())));
        }
        out.insert(code);
    }
    Ok(out)
}

/// Replace the permission set of `role_id` with `codes`.
pub async fn set_role_permissions(
    db: &DatabaseConnection,
    actor: Uuid,
    role_id: Uuid,
    codes: &[String],
) -> Result<Vec<String>, ServiceError> {
    let wanted = clean_codes(codes)?;
    let role = get(db, role_id).await?;

    let txn = db.begin().await?;
    let perms = permission::Entity::find()
        .filter(permission::Column::Code.is_in(wanted.iter().cloned()))
        .all(&txn)
        .await?;
    if perms.len() != wanted.len() {
        return Err(ServiceError::validation("permission catalog is not seeded"));
    }
    let before = permission_codes(&txn, role_id).await?;
    role_permission::Entity::delete_many()
        .filter(role_permission::Column::RoleId.eq(role_id))
        .exec(&txn)
        .await?;
    if !perms.is_empty() {
        role_permission::Entity::insert_many(perms.iter().map(|p| role_permission::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(p.id),
        }))
        .exec(&txn)
        .await?;
    }
    let after: Vec<String> = wanted.into_iter().collect();
    audit_service::record(
        &txn,
        Some(actor),
        AuditAction::Permisos,
        role::Entity::LABEL,
        Some(role_id),
        json!({ "before": before, "after": after }),
    )
    .await?;
    txn.commit().await?;

    info!(role = %role.name, count = after.len(), %actor, "role_permissions_set");
    Ok(after)
}

/// Insert catalog entries missing from the `permission` table; returns how
/// many were added.
pub async fn sync_catalog<C: ConnectionTrait>(db: &C) -> Result<u64, ServiceError> {
    let existing: BTreeSet<String> = permission::Entity::find().all(db).await?.into_iter().map(|p| p.code).collect();
    let now = Utc::now().into();
    let missing: Vec<permission::ActiveModel> = rbac::catalog()
        .into_iter()
        .filter(|d| !existing.contains(&d.code))
        .map(|d| permission::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(d.code),
            module: Set(d.module),
            description: Set(d.description),
            created_at: Set(now),
        })
        .collect();
    if missing.is_empty() {
        return Ok(0);
    }
    let added = permission::Entity::insert_many(missing)
        .on_conflict(OnConflict::column(permission::Column::Code).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{db_or_skip, unique};

    #[test]
    fn codes_are_normalized_and_checked() {
        let set = clean_codes(&[" Edificios.Read ".into(), "edificios.read".into(), "ufvs.export".into()]).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["edificios.read", "ufvs.export"]);
        assert!(matches!(clean_codes(&["bajas.export".into()]), Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn permissions_are_replaced_as_a_set() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        sync_catalog(&db).await?;
        let actor = Uuid::new_v4();
        let r = create(&db, actor, RoleInput { name: unique("consulta "), description: None }).await?;
        assert_eq!(r.name, r.name.to_uppercase());

        let dup = create(&db, actor, RoleInput { name: r.name.to_lowercase(), description: None }).await;
        assert!(matches!(dup, Err(ServiceError::Duplicate(_))));

        set_role_permissions(&db, actor, r.id, &["edificios.read".into(), "edificios.write".into()]).await?;
        let got = set_role_permissions(&db, actor, r.id, &["ufvs.read".into()]).await?;
        assert_eq!(got, vec!["ufvs.read"]);
        assert_eq!(get_role_permissions(&db, r.id).await?, vec!["ufvs.read"]);

        let bad = set_role_permissions(&db, actor, r.id, &["ufvs.read".into(), "nada.read".into()]).await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));
        assert_eq!(permission_codes(&db, r.id).await?, vec!["ufvs.read"]);
        Ok(())
    }

    async fn admin_role(db: &DatabaseConnection, actor: Uuid) -> Result<role::Model, anyhow::Error> {
        let existing = role::Entity::find().filter(role::Column::Name.eq(ADMIN_ROLE)).one(db).await?;
        if let Some(r) = existing {
            return Ok(r);
        }
        match create(db, actor, RoleInput { name: ADMIN_ROLE.to_lowercase(), description: None }).await {
            Ok(r) => Ok(r),
            // created by a concurrent test
            Err(ServiceError::Duplicate(_)) => Ok(role::Entity::find()
                .filter(role::Column::Name.eq(ADMIN_ROLE))
                .one(db)
                .await?
                .ok_or_else(|| anyhow::anyhow!("admin role vanished"))?),
            Err(e) => Err(e.into()),
        }
    }

    #[tokio::test]
    async fn administrator_role_is_locked() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let admin = admin_role(&db, actor).await?;

        let rename = update(&db, actor, admin.id, RoleInput { name: "SUPERVISOR".into(), description: None }).await;
        assert!(matches!(rename, Err(ServiceError::Conflict(_))));
        assert!(matches!(toggle(&db, actor, admin.id).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(delete(&db, actor, admin.id).await, Err(ServiceError::Conflict(_))));
        assert_eq!(get(&db, admin.id).await?.status, status::ACTIVO);

        // same name in another case is not a rename
        let same = RoleInput { name: ADMIN_ROLE.to_lowercase(), description: admin.description.clone() };
        assert_eq!(update(&db, actor, admin.id, same).await?.name, ADMIN_ROLE);
        Ok(())
    }

    #[tokio::test]
    async fn other_roles_toggle_and_reject_long_names() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let actor = Uuid::new_v4();
        let r = create(&db, actor, RoleInput { name: unique("auditor "), description: Some("  ".into()) }).await?;
        assert_eq!(r.description, None);
        assert_eq!(toggle(&db, actor, r.id).await?, Status::Inactivo);

        let long = create(&db, actor, RoleInput { name: "R".repeat(65), description: None }).await;
        assert!(matches!(long, Err(ServiceError::Model(_))));
        let long_desc = create(&db, actor, RoleInput { name: unique("r"), description: Some("d".repeat(256)) }).await;
        assert!(matches!(long_desc, Err(ServiceError::Model(_))));
        Ok(())
    }
}
