use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use models::{permission, role};
use serde::Serialize;
use service::auth::domain::CurrentUser;
use service::pagination::{ListParams, Page};
use service::role_service::{self, PermissionsInput, RoleInput};
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, perm, ApiResult, CreatedResult, StatusBody};
use crate::errors::JsonApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/permisos", perm("roles.read", get(list_permissions)))
        .route("/roles", perm("roles.read", get(list_roles)).merge(perm("roles.write", post(create_role))))
        .route(
            "/roles/:id",
            perm("roles.read", get(get_role)).merge(perm("roles.write", put(update_role).delete(delete_role))),
        )
        .route("/roles/:id/estado", perm("roles.write", patch(toggle_role)))
        .route(
            "/roles/:id/permisos",
            perm("roles.read", get(get_role_permissions)).merge(perm("roles.write", put(set_role_permissions))),
        )
}

#[derive(Debug, Serialize)]
pub struct RolePermissions {
    pub role_id: Uuid,
    pub permissions: Vec<String>,
}

#[utoipa::path(get, path = "/permisos", tag = "rbac", responses((status = 200, description = "Permission catalog")))]
pub async fn list_permissions(State(state): State<ServerState>) -> ApiResult<Vec<permission::Model>> {
    Ok(Json(role_service::list_permissions(&state.db).await?))
}

async fn list_roles(State(state): State<ServerState>, Query(params): Query<ListParams>) -> ApiResult<Page<role::Model>> {
    Ok(Json(role_service::list(&state.db, &params).await?))
}

async fn get_role(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<role::Model> {
    Ok(Json(role_service::get(&state.db, id).await?))
}

async fn create_role(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<RoleInput>,
) -> CreatedResult<role::Model> {
    Ok(created(role_service::create(&state.db, user.id, input).await?))
}

async fn update_role(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<RoleInput>,
) -> ApiResult<role::Model> {
    Ok(Json(role_service::update(&state.db, user.id, id, input).await?))
}

async fn toggle_role(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusBody> {
    let status = role_service::toggle(&state.db, user.id, id).await?;
    Ok(Json(StatusBody { id, status }))
}

async fn delete_role(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    role_service::delete(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_role_permissions(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<RolePermissions> {
    let permissions = role_service::get_role_permissions(&state.db, id).await?;
    Ok(Json(RolePermissions { role_id: id, permissions }))
}

/// Replaces the whole permission set of the role.
#[utoipa::path(
    put, path = "/roles/{id}/permisos", tag = "rbac",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = crate::openapi::PermissionsRequest,
    responses(
        (status = 200, description = "Permission set after the change"),
        (status = 400, description = "Unknown permission code"),
        (status = 404, description = "Not Found"),
    )
)]
pub async fn set_role_permissions(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<PermissionsInput>,
) -> ApiResult<RolePermissions> {
    let permissions = role_service::set_role_permissions(&state.db, user.id, id, &input.permissions).await?;
    Ok(Json(RolePermissions { role_id: id, permissions }))
}
