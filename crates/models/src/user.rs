use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{personal, role};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role_id: Uuid,
    pub personal_id: Option<Uuid>,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Role,
    Personal,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Role => Entity::belongs_to(role::Entity)
                .from(Column::RoleId)
                .to(role::Column::Id)
                .into(),
            Relation::Personal => Entity::belongs_to(personal::Entity)
                .from(Column::PersonalId)
                .to(personal::Column::Id)
                .into(),
        }
    }
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef { Relation::Role.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("user");

pub const MIN_PASSWORD_LEN: usize = 8;

/// Usernames are lowercase, 3..=64 chars of `[a-z0-9._-]`.
pub fn normalize_username(username: &str) -> Result<String, ModelError> {
    let u = username.trim().to_ascii_lowercase();
    if u.len() < 3 || u.len() > 64 {
        return Err(ModelError::validation("username must be 3..=64 characters"));
    }
    if !u.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')) {
        return Err(ModelError::validation("username may only contain a-z, 0-9, '.', '_' and '-'"));
    }
    Ok(u)
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ModelError::validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}
