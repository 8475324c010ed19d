use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Top-level accounting groups are numbered `001`, `002`, ...
pub const CODE_WIDTH: usize = 3;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grupo_contable")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(unique)]
    pub name: String,
    pub useful_life_years: i32,
    /// Annual depreciation, percent.
    pub depreciation_rate: f64,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("grupo_contable");

pub fn validate_useful_life(years: i32) -> Result<i32, ModelError> {
    if !(1..=100).contains(&years) {
        return Err(ModelError::validation("useful_life_years must be within 1..=100"));
    }
    Ok(years)
}

pub fn validate_depreciation_rate(rate: f64) -> Result<f64, ModelError> {
    if !rate.is_finite() || rate <= 0.0 || rate > 100.0 {
        return Err(ModelError::validation("depreciation_rate must be within (0, 100]"));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn useful_life_bounds() {
        assert!(validate_useful_life(0).is_err());
        assert_eq!(validate_useful_life(1).unwrap(), 1);
        assert_eq!(validate_useful_life(100).unwrap(), 100);
        assert!(validate_useful_life(101).is_err());
        assert!(validate_useful_life(-5).is_err());
    }

    #[test]
    fn depreciation_rate_bounds() {
        assert!(validate_depreciation_rate(0.0).is_err());
        assert!(validate_depreciation_rate(-2.5).is_err());
        assert_eq!(validate_depreciation_rate(2.5).unwrap(), 2.5);
        assert_eq!(validate_depreciation_rate(100.0).unwrap(), 100.0);
        assert!(validate_depreciation_rate(100.01).is_err());
        assert!(validate_depreciation_rate(f64::NAN).is_err());
        assert!(validate_depreciation_rate(f64::INFINITY).is_err());
    }
}
