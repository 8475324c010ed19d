//! Startup bootstrap: permission catalog, `ADMINISTRADOR` role and the
//! configured admin account. Safe to run on every start.

use chrono::Utc;
use models::{permission, role, role_permission, status, user};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::rbac::ADMIN_ROLE;
use crate::role_service;
use crate::user_service::{self, CreateUserInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub permissions_added: u64,
    pub admin_role_id: Uuid,
    pub admin_created: bool,
}

pub async fn run(db: &DatabaseConnection, cfg: &configs::AuthConfig) -> Result<SeedReport, ServiceError> {
    let permissions_added = role_service::sync_catalog(db).await?;
    let admin_role_id = ensure_admin_role(db).await?;
    let admin_created = ensure_admin_user(db, cfg, admin_role_id).await?;
    if cfg.uses_dev_secret() {
        warn!("JWT secret is the development default; set auth.jwt_secret or JWT_SECRET");
    }
    info!(permissions_added, %admin_role_id, admin_created, "seed_done");
    Ok(SeedReport { permissions_added, admin_role_id, admin_created })
}

/// The admin role always ends up `ACTIVO` and holding every permission.
async fn ensure_admin_role(db: &DatabaseConnection) -> Result<Uuid, ServiceError> {
    let existing = role::Entity::find().filter(role::Column::Name.eq(ADMIN_ROLE)).one(db).await?;
    let role_id = match existing {
        Some(r) => {
            if r.status != status::ACTIVO {
                let mut am: role::ActiveModel = r.clone().into();
                am.status = Set(status::ACTIVO.into());
                am.updated_at = Set(Utc::now().into());
                am.update(db).await?;
            }
            r.id
        }
        None => {
            let now = Utc::now().into();
            role::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(ADMIN_ROLE.into()),
                description: Set(Some("Acceso total al sistema".into())),
                status: Set(status::ACTIVO.into()),
                created_by: Set(None),
                updated_by: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
            .id
        }
    };

    let grants: Vec<role_permission::ActiveModel> = permission::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| role_permission::ActiveModel { role_id: Set(role_id), permission_id: Set(p.id) })
        .collect();
    if !grants.is_empty() {
        role_permission::Entity::insert_many(grants)
            .on_conflict(
                OnConflict::columns([role_permission::Column::RoleId, role_permission::Column::PermissionId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }
    Ok(role_id)
}

/// Creates the admin account when missing; an existing one keeps its password.
async fn ensure_admin_user(db: &DatabaseConnection, cfg: &configs::AuthConfig, role_id: Uuid) -> Result<bool, ServiceError> {
    let username = user::normalize_username(&cfg.admin_username)?;
    if user::Entity::find().filter(user::Column::Username.eq(username.as_str())).one(db).await?.is_some() {
        return Ok(false);
    }
    if cfg.admin_password.is_empty() {
        return Err(ServiceError::validation("auth.admin_password (or ADMIN_PASSWORD) is required to create the admin user"));
    }
    user_service::create_user(
        db,
        None,
        CreateUserInput {
            username,
            email: None,
            full_name: cfg.admin_full_name.clone(),
            role_id,
            personal_id: None,
            password: cfg.admin_password.clone(),
        },
    )
    .await?;
    info!(username = %cfg.admin_username, "admin_user_created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac;
    use crate::test_support::{db_or_skip, unique};

    #[tokio::test]
    async fn seeding_twice_is_stable() -> Result<(), anyhow::Error> {
        let db = db_or_skip!();
        let cfg = configs::AuthConfig {
            admin_username: unique("admin.").to_lowercase(),
            admin_password: "AdminClave1".into(),
            ..configs::AuthConfig::default()
        };
        let first = run(&db, &cfg).await?;
        assert!(first.admin_created);
        let second = run(&db, &cfg).await?;
        assert!(!second.admin_created);
        assert_eq!(second.permissions_added, 0);
        assert_eq!(first.admin_role_id, second.admin_role_id);

        let codes = role_service::permission_codes(&db, first.admin_role_id).await?;
        assert_eq!(codes.len(), rbac::catalog().len());
        Ok(())
    }
}
