use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use models::{auxiliar, grupo_contable as grupo};
use serde::Deserialize;
use service::auth::domain::CurrentUser;
use service::contabilidad::auxiliar_service::{self, AuxiliarFilter, AuxiliarInput, AuxiliarUpdate};
use service::contabilidad::grupo_contable_service::{self, GrupoContableInput};
use service::pagination::{ListParams, Page};
use service::report::exports;
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, pdf_download, perm, soft_delete, toggle_status, ApiResult, CreatedResult, NextCode};
use crate::errors::JsonApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/grupos-contables",
            perm("grupos_contables.read", get(list_grupos)).merge(perm("grupos_contables.write", post(create_grupo))),
        )
        .route("/grupos-contables/siguiente-codigo", perm("grupos_contables.read", get(next_grupo_code)))
        .route(
            "/grupos-contables/:id",
            perm("grupos_contables.read", get(get_grupo))
                .merge(perm("grupos_contables.write", put(update_grupo).delete(soft_delete::<grupo::Entity>))),
        )
        .route("/grupos-contables/:id/estado", perm("grupos_contables.write", patch(toggle_status::<grupo::Entity>)))
        .route(
            "/auxiliares",
            perm("auxiliares.read", get(list_auxiliares)).merge(perm("auxiliares.write", post(create_auxiliar))),
        )
        .route("/auxiliares/siguiente-codigo", perm("auxiliares.read", get(next_auxiliar_code)))
        .route("/auxiliares/exportar/pdf", perm("auxiliares.export", get(export_auxiliares)))
        .route(
            "/auxiliares/:id",
            perm("auxiliares.read", get(get_auxiliar))
                .merge(perm("auxiliares.write", put(update_auxiliar).delete(soft_delete::<auxiliar::Entity>))),
        )
        .route("/auxiliares/:id/estado", perm("auxiliares.write", patch(toggle_status::<auxiliar::Entity>)))
}

async fn list_grupos(State(state): State<ServerState>, Query(params): Query<ListParams>) -> ApiResult<Page<grupo::Model>> {
    Ok(Json(grupo_contable_service::list(&state.db, &params).await?))
}

#[utoipa::path(
    get, path = "/grupos-contables/siguiente-codigo", tag = "contabilidad",
    responses((status = 200, description = "Code the next grupo contable will get"))
)]
pub async fn next_grupo_code(State(state): State<ServerState>) -> ApiResult<NextCode> {
    Ok(Json(NextCode { code: grupo_contable_service::next_code(&state.db).await? }))
}

async fn get_grupo(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<grupo::Model> {
    Ok(Json(grupo_contable_service::get(&state.db, id).await?))
}

async fn create_grupo(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<GrupoContableInput>,
) -> CreatedResult<grupo::Model> {
    Ok(created(grupo_contable_service::create(&state.db, user.id, input).await?))
}

async fn update_grupo(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<GrupoContableInput>,
) -> ApiResult<grupo::Model> {
    Ok(Json(grupo_contable_service::update(&state.db, user.id, id, input).await?))
}

async fn list_auxiliares(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<AuxiliarFilter>,
) -> ApiResult<Page<auxiliar::Model>> {
    Ok(Json(auxiliar_service::list(&state.db, &params, &filter).await?))
}

#[derive(Debug, Deserialize)]
pub struct GrupoQuery {
    pub grupo_contable_id: Uuid,
}

#[utoipa::path(
    get, path = "/auxiliares/siguiente-codigo", tag = "contabilidad",
    params(("grupo_contable_id" = Uuid, Query, description = "Parent grupo contable")),
    responses((status = 200, description = "Code the next auxiliar of the group will get"))
)]
pub async fn next_auxiliar_code(State(state): State<ServerState>, Query(q): Query<GrupoQuery>) -> ApiResult<NextCode> {
    Ok(Json(NextCode { code: auxiliar_service::next_code(&state.db, q.grupo_contable_id).await? }))
}

#[utoipa::path(
    get, path = "/auxiliares/exportar/pdf", tag = "contabilidad",
    params(crate::openapi::ListQuery, ("grupo_contable_id" = Option<Uuid>, Query, description = "Filter by grupo contable")),
    responses((status = 200, description = "PDF", content_type = "application/pdf"))
)]
pub async fn export_auxiliares(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<AuxiliarFilter>,
) -> Result<Response, JsonApiError> {
    let table = exports::auxiliares_report(&state.db, &params, &filter).await?;
    pdf_download(&state, table, "auxiliares").await
}

async fn get_auxiliar(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<auxiliar::Model> {
    Ok(Json(auxiliar_service::get(&state.db, id).await?))
}

async fn create_auxiliar(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<AuxiliarInput>,
) -> CreatedResult<auxiliar::Model> {
    Ok(created(auxiliar_service::create(&state.db, user.id, input).await?))
}

async fn update_auxiliar(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<AuxiliarUpdate>,
) -> ApiResult<auxiliar::Model> {
    Ok(Json(auxiliar_service::update(&state.db, user.id, id, input).await?))
}
