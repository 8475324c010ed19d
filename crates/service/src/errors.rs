use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::codes::CodeError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
    #[error("report error: {0}")]
    Report(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn duplicate(entity: &str, field: &str, value: &str) -> Self {
        Self::Duplicate(format!("{entity} with {field} '{value}' already exists"))
    }

    pub fn inactive(entity: &str) -> Self { Self::Validation(format!("{entity} is inactive")) }

    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => ServiceError::Duplicate(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => ServiceError::Validation(detail),
            _ => ServiceError::Db(e.to_string()),
        }
    }
}

impl From<CodeError> for ServiceError {
    fn from(e: CodeError) -> Self { ServiceError::Validation(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_db_errors_stay_db() {
        let e: ServiceError = DbErr::Custom("boom".into()).into();
        assert!(matches!(e, ServiceError::Db(_)));
    }

    #[test]
    fn exhausted_correlator_is_validation() {
        let e: ServiceError = CodeError::Exhausted { prefix: "001.".into(), width: 4 }.into();
        assert!(matches!(e, ServiceError::Validation(m) if m.contains("001.")));
    }
}
