use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Error body returned by every handler: `{"error": ..., "message": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", Some(message.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.error, message: self.message.as_deref() };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let msg = Some(e.to_string());
        match e {
            ServiceError::Validation(_) | ServiceError::Model(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", msg),
            ServiceError::Duplicate(_) => Self::new(StatusCode::BAD_REQUEST, "Duplicate", msg),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", msg),
            ServiceError::Conflict(_) => Self::new(StatusCode::CONFLICT, "Conflict", msg),
            ServiceError::Db(_) | ServiceError::Report(_) | ServiceError::Internal(_) => {
                error!(err = %e, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", msg)
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let msg = Some(e.to_string());
        match e {
            AuthError::Unauthorized | AuthError::Inactive => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", msg),
            AuthError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, "Forbidden", msg),
            AuthError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", msg),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, "Not Found", msg),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                warn!(code = e.code(), err = %e, "auth failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", msg)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::validation("x"), StatusCode::BAD_REQUEST),
            (ServiceError::Model(ModelError::validation("bad code")), StatusCode::BAD_REQUEST),
            (ServiceError::duplicate("ciudad", "code", "LPZ"), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("edificio"), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("baja".into()), StatusCode::CONFLICT),
            (ServiceError::Report("wkhtmltopdf".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::from(sea_orm::DbErr::Conn(sea_orm::RuntimeErr::Internal("connection reset".into()))), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::from(service::codes::CodeError::Exhausted { prefix: "".into(), width: 3 }), StatusCode::BAD_REQUEST),
        ];
        for (e, status) in cases {
            assert_eq!(JsonApiError::from(e).status, status);
        }
    }

    #[test]
    fn auth_errors_map_to_status() {
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Inactive).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Forbidden("x".into())).status, StatusCode::FORBIDDEN);
    }
}
