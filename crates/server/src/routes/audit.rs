use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use models::audit_log;
use service::audit_service::{self, AuditFilter};
use service::pagination::Page;

use super::auth::ServerState;
use super::common::{perm, ApiResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/bitacora", perm("bitacora.read", get(list_audit)))
}

#[utoipa::path(
    get, path = "/bitacora", tag = "bitacora",
    params(crate::openapi::AuditQuery),
    responses((status = 200, description = "Audit entries, newest first"), (status = 400, description = "Validation Error"))
)]
pub async fn list_audit(State(state): State<ServerState>, Query(filter): Query<AuditFilter>) -> ApiResult<Page<audit_log::Model>> {
    Ok(Json(audit_service::list(&state.db, &filter).await?))
}
