//! Pieces shared by the resource routers.

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::{Extension, Json};
use models::{SoftState, Status};
use serde::Serialize;
use service::auth::domain::CurrentUser;
use service::report::{self, ReportTable};
use service::status_service;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::routes::auth::{require_permission, ServerState};

/// Attach the permission guard to `route`.
pub fn perm(permission: &'static str, route: MethodRouter<ServerState>) -> MethodRouter<ServerState> {
    route.route_layer(middleware::from_fn_with_state(permission, require_permission))
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub id: Uuid,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct NextCode {
    pub code: String,
}

pub type ApiResult<T> = Result<Json<T>, JsonApiError>;
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), JsonApiError>;

pub fn created<T: Serialize>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}

/// `PATCH /{resource}/:id/estado` for entities without extra state rules.
pub async fn toggle_status<E>(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusBody>
where
    E: SoftState + Send + Sync + 'static,
{
    let status = status_service::toggle::<E>(&state.db, user.id, id).await?;
    Ok(Json(StatusBody { id, status }))
}

/// `DELETE /{resource}/:id`: the row stays, as `INACTIVO`.
pub async fn soft_delete<E>(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError>
where
    E: SoftState + Send + Sync + 'static,
{
    status_service::soft_delete::<E>(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rasterize `table` and send it as a download named after `stem`.
pub async fn pdf_download(state: &ServerState, table: ReportTable, stem: &str) -> Result<Response, JsonApiError> {
    let bytes = report::to_pdf(state.pdf.as_ref(), &state.institution, &table).await?;
    let disposition = format!("attachment; filename=\"{}\"", report::file_name(stem));
    let mut res = bytes.into_response();
    let headers = res.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    if let Ok(v) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, v);
    }
    Ok(res)
}
