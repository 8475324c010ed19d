use chrono::Utc;
use models::status::Status;
use models::{role, user, user_credentials};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

use crate::audit_service::{self, AuditAction};
use crate::auth::domain::{AuthUser, Credentials, RoleAccess};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::role_service;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_auth_user(u: user::Model) -> AuthUser {
    AuthUser {
        active: Status::is_active(&u.status),
        id: u.id,
        username: u.username,
        full_name: u.full_name,
        email: u.email,
        role_id: u.role_id,
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(res.map(to_auth_user))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::Entity::find()
            .filter(user_credentials::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm).await?;
        Ok(Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm })
    }

    async fn role_access(&self, role_id: Uuid) -> Result<Option<RoleAccess>, AuthError> {
        let Some(r) = role::Entity::find_by_id(role_id).one(&self.db).await? else {
            return Ok(None);
        };
        let permissions = role_service::permission_codes(&self.db, role_id).await?;
        Ok(Some(RoleAccess {
            role_id: r.id,
            active: Status::is_active(&r.status),
            name: r.name,
            permissions: permissions.into_iter().collect(),
        }))
    }

    async fn record_login(&self, user_id: Uuid) -> Result<(), AuthError> {
        user::Entity::update_many()
            .col_expr(user::Column::LastLoginAt, Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;
        audit_service::record(&self.db, Some(user_id), AuditAction::Login, "user", Some(user_id), json!({})).await?;
        Ok(())
    }

    async fn record_password_change(&self, user_id: Uuid) -> Result<(), AuthError> {
        audit_service::record(&self.db, Some(user_id), AuditAction::Password, "user", Some(user_id), json!({ "self": true })).await?;
        Ok(())
    }
}
