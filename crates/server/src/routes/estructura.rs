use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use models::{ambiente, area, cargo, unidad_organizacional as unidad};
use serde::Deserialize;
use service::auth::domain::CurrentUser;
use service::estructura::ambiente_service::{self, AmbienteFilter, AmbienteInput};
use service::estructura::area_service::{self, AreaFilter, AreaInput};
use service::estructura::cargo_service::{self, CargoFilter, CargoInput};
use service::estructura::unidad_service::{self, UnidadInput};
use service::pagination::{ListParams, Page};
use service::report::exports;
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, pdf_download, perm, soft_delete, toggle_status, ApiResult, CreatedResult, NextCode};
use crate::errors::JsonApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/unidades", perm("unidades.read", get(list_unidades)).merge(perm("unidades.write", post(create_unidad))))
        .route(
            "/unidades/:id",
            perm("unidades.read", get(get_unidad))
                .merge(perm("unidades.write", put(update_unidad).delete(soft_delete::<unidad::Entity>))),
        )
        .route("/unidades/:id/estado", perm("unidades.write", patch(toggle_status::<unidad::Entity>)))
        .route("/areas", perm("areas.read", get(list_areas)).merge(perm("areas.write", post(create_area))))
        .route(
            "/areas/:id",
            perm("areas.read", get(get_area)).merge(perm("areas.write", put(update_area).delete(soft_delete::<area::Entity>))),
        )
        .route("/areas/:id/estado", perm("areas.write", patch(toggle_status::<area::Entity>)))
        .route("/ambientes", perm("ambientes.read", get(list_ambientes)).merge(perm("ambientes.write", post(create_ambiente))))
        .route("/ambientes/siguiente-codigo", perm("ambientes.read", get(next_ambiente_code)))
        .route("/ambientes/exportar/pdf", perm("ambientes.export", get(export_ambientes)))
        .route(
            "/ambientes/:id",
            perm("ambientes.read", get(get_ambiente))
                .merge(perm("ambientes.write", put(update_ambiente).delete(soft_delete::<ambiente::Entity>))),
        )
        .route("/ambientes/:id/estado", perm("ambientes.write", patch(toggle_status::<ambiente::Entity>)))
        .route("/cargos", perm("cargos.read", get(list_cargos)).merge(perm("cargos.write", post(create_cargo))))
        .route(
            "/cargos/:id",
            perm("cargos.read", get(get_cargo)).merge(perm("cargos.write", put(update_cargo).delete(soft_delete::<cargo::Entity>))),
        )
        .route("/cargos/:id/estado", perm("cargos.write", patch(toggle_status::<cargo::Entity>)))
}

async fn list_unidades(State(state): State<ServerState>, Query(params): Query<ListParams>) -> ApiResult<Page<unidad::Model>> {
    Ok(Json(unidad_service::list(&state.db, &params).await?))
}

async fn get_unidad(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<unidad::Model> {
    Ok(Json(unidad_service::get(&state.db, id).await?))
}

async fn create_unidad(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<UnidadInput>,
) -> CreatedResult<unidad::Model> {
    Ok(created(unidad_service::create(&state.db, user.id, input).await?))
}

async fn update_unidad(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UnidadInput>,
) -> ApiResult<unidad::Model> {
    Ok(Json(unidad_service::update(&state.db, user.id, id, input).await?))
}

async fn list_areas(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<AreaFilter>,
) -> ApiResult<Page<area::Model>> {
    Ok(Json(area_service::list(&state.db, &params, &filter).await?))
}

async fn get_area(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<area::Model> {
    Ok(Json(area_service::get(&state.db, id).await?))
}

async fn create_area(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<AreaInput>,
) -> CreatedResult<area::Model> {
    Ok(created(area_service::create(&state.db, user.id, input).await?))
}

async fn update_area(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<AreaInput>,
) -> ApiResult<area::Model> {
    Ok(Json(area_service::update(&state.db, user.id, id, input).await?))
}

#[utoipa::path(
    get, path = "/ambientes", tag = "estructura",
    params(crate::openapi::ListQuery, ("area_id" = Option<Uuid>, Query, description = "Filter by area")),
    responses((status = 200, description = "Page of ambientes"))
)]
pub async fn list_ambientes(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<AmbienteFilter>,
) -> ApiResult<Page<ambiente::Model>> {
    Ok(Json(ambiente_service::list(&state.db, &params, &filter).await?))
}

#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    pub area_id: Uuid,
}

#[utoipa::path(
    get, path = "/ambientes/siguiente-codigo", tag = "estructura",
    params(("area_id" = Uuid, Query, description = "Parent area")),
    responses((status = 200, description = "Code the next ambiente of the area will get"))
)]
pub async fn next_ambiente_code(State(state): State<ServerState>, Query(q): Query<AreaQuery>) -> ApiResult<NextCode> {
    Ok(Json(NextCode { code: ambiente_service::next_code(&state.db, q.area_id).await? }))
}

#[utoipa::path(
    get, path = "/ambientes/exportar/pdf", tag = "estructura",
    params(crate::openapi::ListQuery, ("area_id" = Option<Uuid>, Query, description = "Filter by area")),
    responses((status = 200, description = "PDF", content_type = "application/pdf"))
)]
pub async fn export_ambientes(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<AmbienteFilter>,
) -> Result<Response, JsonApiError> {
    let table = exports::ambientes_report(&state.db, &params, &filter).await?;
    pdf_download(&state, table, "ambientes").await
}

async fn get_ambiente(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<ambiente::Model> {
    Ok(Json(ambiente_service::get(&state.db, id).await?))
}

async fn create_ambiente(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<AmbienteInput>,
) -> CreatedResult<ambiente::Model> {
    Ok(created(ambiente_service::create(&state.db, user.id, input).await?))
}

async fn update_ambiente(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<AmbienteInput>,
) -> ApiResult<ambiente::Model> {
    Ok(Json(ambiente_service::update(&state.db, user.id, id, input).await?))
}

async fn list_cargos(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CargoFilter>,
) -> ApiResult<Page<cargo::Model>> {
    Ok(Json(cargo_service::list(&state.db, &params, &filter).await?))
}

async fn get_cargo(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<cargo::Model> {
    Ok(Json(cargo_service::get(&state.db, id).await?))
}

async fn create_cargo(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<CargoInput>,
) -> CreatedResult<cargo::Model> {
    Ok(created(cargo_service::create(&state.db, user.id, input).await?))
}

async fn update_cargo(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<CargoInput>,
) -> ApiResult<cargo::Model> {
    Ok(Json(cargo_service::update(&state.db, user.id, id, input).await?))
}
