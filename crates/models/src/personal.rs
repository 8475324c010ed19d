use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cargo;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "personal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cargo_id: Uuid,
    #[sea_orm(unique)]
    pub ci: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Cargo,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Cargo => Entity::belongs_to(cargo::Entity)
                .from(Column::CargoId)
                .to(cargo::Column::Id)
                .into(),
        }
    }
}

impl Related<cargo::Entity> for Entity {
    fn to() -> RelationDef { Relation::Cargo.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("personal");

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Cédula de identidad: digits with an optional alphanumeric complement
/// (`1234567`, `1234567-1B`, `1234567 LP`).
pub fn normalize_ci(ci: &str) -> Result<String, ModelError> {
    let c = ci.trim().to_ascii_uppercase();
    let (number, complement) = match c.split_once(|ch: char| ch == '-' || ch == ' ') {
        Some((n, rest)) => (n, Some(rest.trim())),
        None => (c.as_str(), None),
    };
    if number.len() < 4 || number.len() > 12 || !number.chars().all(|d| d.is_ascii_digit()) {
        return Err(ModelError::validation("ci must start with 4..=12 digits"));
    }
    if let Some(extra) = complement {
        if extra.is_empty() || extra.len() > 6 || !extra.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(ModelError::validation("invalid ci complement"));
        }
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ci_accepts_plain_and_complemented() {
        assert_eq!(normalize_ci(" 4789123 ").unwrap(), "4789123");
        assert_eq!(normalize_ci("4789123-1b").unwrap(), "4789123-1B");
        assert_eq!(normalize_ci("4789123 LP").unwrap(), "4789123 LP");
    }

    #[test]
    fn ci_rejects_garbage() {
        assert!(normalize_ci("12").is_err());
        assert!(normalize_ci("ABC1234").is_err());
        assert!(normalize_ci("4789123-").is_err());
        assert!(normalize_ci("4789123-#1").is_err());
    }
}
