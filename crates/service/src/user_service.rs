//! System users. Credentials live in `user_credentials` and are written in
//! the same transaction as the user row.

use chrono::Utc;
use models::validation::{validate_email, validate_name};
use models::{personal, role, status, user, user_credentials, Status};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::audit_service::{self, AuditAction};
use crate::auth::service::{hash_password, PASSWORD_ALGORITHM};
use crate::errors::ServiceError;
use crate::pagination::{fetch_page, matches_any, with_status, ListParams, Page};
use crate::persist::{ensure_unique, update_audited};
use crate::status_service;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub full_name: String,
    pub role_id: Uuid,
    #[serde(default)]
    pub personal_id: Option<Uuid>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserInput {
    #[serde(default)]
    pub email: Option<String>,
    pub full_name: String,
    pub role_id: Uuid,
    #[serde(default)]
    pub personal_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordInput {
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role_id: Option<Uuid>,
}

fn hashed(password: &str) -> Result<String, ServiceError> {
    user::validate_password(password)?;
    hash_password(password).map_err(|e| ServiceError::Internal(e.to_string()))
}

async fn check_refs(db: &DatabaseConnection, role_id: Uuid, personal_id: Option<Uuid>) -> Result<(), ServiceError> {
    status_service::require_active::<role::Entity, _>(db, role_id).await?;
    if let Some(pid) = personal_id {
        status_service::find::<personal::Entity, _>(db, pid).await?;
    }
    Ok(())
}

pub async fn list_users(db: &DatabaseConnection, params: &ListParams, filter: &UserFilter) -> Result<Page<user::Model>, ServiceError> {
    let mut q = with_status(user::Entity::find(), params)?;
    if let Some(role_id) = filter.role_id {
        q = q.filter(user::Column::RoleId.eq(role_id));
    }
    if let Some(term) = params.search() {
        q = q.filter(matches_any(&[user::Column::Username, user::Column::FullName, user::Column::Email], &term));
    }
    fetch_page(q.order_by_asc(user::Column::Username), db, params.pagination()).await
}

pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    status_service::find::<user::Entity, _>(db, id).await
}

/// Create a user together with its argon2 credentials.
#[instrument(skip(db, input), fields(username = %input.username))]
pub async fn create_user(db: &DatabaseConnection, actor: Option<Uuid>, input: CreateUserInput) -> Result<user::Model, ServiceError> {
    let username = user::normalize_username(&input.username)?;
    let full_name = validate_name(&input.full_name)?;
    let email = validate_email(input.email.as_deref())?;
    let hash = hashed(&input.password)?;
    check_refs(db, input.role_id, input.personal_id).await?;
    ensure_unique::<user::Entity, _, _>(db, user::Column::Username, "username", username.clone(), None).await?;

    let id = Uuid::new_v4();
    let now = Utc::now().into();
    let txn = db.begin().await?;
    let saved = user::ActiveModel {
        id: Set(id),
        username: Set(username),
        email: Set(email),
        full_name: Set(full_name),
        role_id: Set(input.role_id),
        personal_id: Set(input.personal_id),
        last_login_at: Set(None),
        status: Set(status::ACTIVO.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    user_credentials::upsert_password(&txn, id, hash, PASSWORD_ALGORITHM).await?;
    audit_service::record(&txn, actor, AuditAction::Crear, "user", Some(id), audit_service::snapshot(&saved)).await?;
    txn.commit().await?;

    info!(%id, username = %saved.username, "user_created");
    Ok(saved)
}

/// Username is fixed; everything else may change.
pub async fn update_user(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: UpdateUserInput) -> Result<user::Model, ServiceError> {
    let current = get_user(db, id).await?;
    let full_name = validate_name(&input.full_name)?;
    let email = validate_email(input.email.as_deref())?;
    check_refs(db, input.role_id, input.personal_id).await?;

    let mut am: user::ActiveModel = current.into();
    am.email = Set(email);
    am.full_name = Set(full_name);
    am.role_id = Set(input.role_id);
    am.personal_id = Set(input.personal_id);
    am.updated_by = Set(Some(actor));
    am.updated_at = Set(Utc::now().into());
    update_audited(db, actor, id, am).await
}

/// Administrative password reset; the user's own change goes through
/// `AuthService::change_password`.
pub async fn reset_password(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: ResetPasswordInput) -> Result<(), ServiceError> {
    get_user(db, id).await?;
    let hash = hashed(&input.password)?;
    let txn = db.begin().await?;
    user_credentials::upsert_password(&txn, id, hash, PASSWORD_ALGORITHM).await?;
    audit_service::record(&txn, Some(actor), AuditAction::Password, "user", Some(id), json!({ "reset_by": actor })).await?;
    txn.commit().await?;
    info!(%id, %actor, "password_reset");
    Ok(())
}

pub async fn toggle_user(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<Status, ServiceError> {
    if actor == id && Status::is_active(&get_user(db, id).await?.status) {
        return Err(ServiceError::Conflict("users cannot deactivate themselves".into()));
    }
    status_service::toggle::<user::Entity>(db, actor, id).await
}

pub async fn delete_user(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    if actor == id {
        return Err(ServiceError::Conflict("users cannot deactivate themselves".into()));
    }
    status_service::soft_delete::<user::Entity>(db, actor, id).await
}
