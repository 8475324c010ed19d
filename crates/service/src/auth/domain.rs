use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Password change for the logged-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role_id: Uuid,
    pub active: bool,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Role with the permission codes granted to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAccess {
    pub role_id: Uuid,
    pub name: String,
    pub active: bool,
    pub permissions: BTreeSet<String>,
}

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// user id
    pub sub: String,
    pub username: String,
    pub role_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller, attached to each guarded request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role_id: Uuid,
    pub role: String,
    pub permissions: BTreeSet<String>,
}

impl CurrentUser {
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub token_type: String,
    /// unix seconds
    pub expires_at: i64,
    pub user: CurrentUser,
}
