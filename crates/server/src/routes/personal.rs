use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use models::personal;
use service::auth::domain::CurrentUser;
use service::pagination::{ListParams, Page};
use service::personal_service::{self, PersonalFilter, PersonalInput};
use service::report::exports;
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, pdf_download, perm, soft_delete, toggle_status, ApiResult, CreatedResult};
use crate::errors::JsonApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/personal", perm("personal.read", get(list_personal)).merge(perm("personal.write", post(create_personal))))
        .route("/personal/exportar/pdf", perm("personal.export", get(export_personal)))
        .route(
            "/personal/:id",
            perm("personal.read", get(get_personal))
                .merge(perm("personal.write", put(update_personal).delete(soft_delete::<personal::Entity>))),
        )
        .route("/personal/:id/estado", perm("personal.write", patch(toggle_status::<personal::Entity>)))
}

#[utoipa::path(
    get, path = "/personal", tag = "personal",
    params(crate::openapi::ListQuery, ("cargo_id" = Option<Uuid>, Query, description = "Filter by cargo")),
    responses((status = 200, description = "Page of personal"), (status = 403, description = "Forbidden"))
)]
pub async fn list_personal(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<PersonalFilter>,
) -> ApiResult<Page<personal::Model>> {
    Ok(Json(personal_service::list(&state.db, &params, &filter).await?))
}

#[utoipa::path(
    get, path = "/personal/exportar/pdf", tag = "personal",
    params(crate::openapi::ListQuery, ("cargo_id" = Option<Uuid>, Query, description = "Filter by cargo")),
    responses((status = 200, description = "PDF", content_type = "application/pdf"))
)]
pub async fn export_personal(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<PersonalFilter>,
) -> Result<Response, JsonApiError> {
    let table = exports::personal_report(&state.db, &params, &filter).await?;
    pdf_download(&state, table, "personal").await
}

async fn get_personal(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<personal::Model> {
    Ok(Json(personal_service::get(&state.db, id).await?))
}

async fn create_personal(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<PersonalInput>,
) -> CreatedResult<personal::Model> {
    Ok(created(personal_service::create(&state.db, user.id, input).await?))
}

async fn update_personal(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<PersonalInput>,
) -> ApiResult<personal::Model> {
    Ok(Json(personal_service::update(&state.db, user.id, id, input).await?))
}
