use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use models::user;
use service::auth::domain::CurrentUser;
use service::pagination::{ListParams, Page};
use service::user_service::{self, CreateUserInput, ResetPasswordInput, UpdateUserInput, UserFilter};
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, perm, ApiResult, CreatedResult, StatusBody};
use crate::errors::JsonApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/usuarios", perm("usuarios.read", get(list_users)).merge(perm("usuarios.write", post(create_user))))
        .route(
            "/usuarios/:id",
            perm("usuarios.read", get(get_user)).merge(perm("usuarios.write", put(update_user).delete(delete_user))),
        )
        .route("/usuarios/:id/estado", perm("usuarios.write", patch(toggle_user)))
        .route("/usuarios/:id/password", perm("usuarios.write", put(reset_password)))
}

#[utoipa::path(
    get, path = "/usuarios", tag = "usuarios",
    params(crate::openapi::ListQuery, ("role_id" = Option<Uuid>, Query, description = "Filter by role")),
    responses((status = 200, description = "Page of users"), (status = 403, description = "Forbidden"))
)]
pub async fn list_users(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Page<user::Model>> {
    Ok(Json(user_service::list_users(&state.db, &params, &filter).await?))
}

async fn get_user(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<user::Model> {
    Ok(Json(user_service::get_user(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/usuarios", tag = "usuarios",
    request_body = crate::openapi::CreateUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Validation Error or duplicate username"),
    )
)]
pub async fn create_user(
    State(state): State<ServerState>,
    Extension(actor): Extension<CurrentUser>,
    Json(input): Json<CreateUserInput>,
) -> CreatedResult<user::Model> {
    Ok(created(user_service::create_user(&state.db, Some(actor.id), input).await?))
}

async fn update_user(
    State(state): State<ServerState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> ApiResult<user::Model> {
    Ok(Json(user_service::update_user(&state.db, actor.id, id, input).await?))
}

async fn toggle_user(
    State(state): State<ServerState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusBody> {
    let status = user_service::toggle_user(&state.db, actor.id, id).await?;
    Ok(Json(StatusBody { id, status }))
}

async fn delete_user(
    State(state): State<ServerState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    user_service::delete_user(&state.db, actor.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reset_password(
    State(state): State<ServerState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<ResetPasswordInput>,
) -> Result<StatusCode, JsonApiError> {
    user_service::reset_password(&state.db, actor.id, id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
