//! `ACTIVO` / `INACTIVO` flag shared by every business table.
//!
//! Rows are never physically removed: deleting sets `INACTIVO` and the
//! status endpoint flips between the two values.

use std::fmt;
use std::str::FromStr;

use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const ACTIVO: &str = "ACTIVO";
pub const INACTIVO: &str = "INACTIVO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Activo,
    Inactivo,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Activo => ACTIVO,
            Status::Inactivo => INACTIVO,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Status::Activo => Status::Inactivo,
            Status::Inactivo => Status::Activo,
        }
    }

    pub fn is_active(value: &str) -> bool {
        value == ACTIVO
    }
}

impl FromStr for Status {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            ACTIVO => Ok(Status::Activo),
            INACTIVO => Ok(Status::Inactivo),
            other => Err(ModelError::Validation(format!("invalid status '{other}' (expected ACTIVO or INACTIVO)"))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities carrying the status flag and audit columns.
pub trait SoftState: EntityTrait {
    /// Name used in error messages and audit rows.
    const LABEL: &'static str;

    fn id_column() -> Self::Column;
    fn status_column() -> Self::Column;
    fn updated_by_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;

    fn status_of(model: &Self::Model) -> &str;
}

/// Implements [`SoftState`] for the `Entity` of the calling module.
#[macro_export]
macro_rules! soft_state {
    ($label:literal) => {
        impl $crate::status::SoftState for Entity {
            const LABEL: &'static str = $label;
            fn id_column() -> Column { Column::Id }
            fn status_column() -> Column { Column::Status }
            fn updated_by_column() -> Column { Column::UpdatedBy }
            fn updated_at_column() -> Column { Column::UpdatedAt }
            fn status_of(model: &Model) -> &str { &model.status }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("activo".parse::<Status>().unwrap(), Status::Activo);
        assert_eq!(" INACTIVO ".parse::<Status>().unwrap(), Status::Inactivo);
        assert!("BORRADO".parse::<Status>().is_err());
    }

    #[test]
    fn toggles_both_ways() {
        assert_eq!(Status::Activo.toggled(), Status::Inactivo);
        assert_eq!(Status::Inactivo.toggled(), Status::Activo);
    }

    #[test]
    fn serializes_as_uppercase() {
        assert_eq!(serde_json::to_string(&Status::Activo).unwrap(), "\"ACTIVO\"");
        let s: Status = serde_json::from_str("\"INACTIVO\"").unwrap();
        assert_eq!(s, Status::Inactivo);
    }
}
