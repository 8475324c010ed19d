use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use models::{ciudad, distrito, nucleo};
use service::auth::domain::CurrentUser;
use service::geografia::ciudad_service::{self, CiudadInput};
use service::geografia::distrito_service::{self, DistritoFilter, DistritoInput};
use service::geografia::nucleo_service::{self, NucleoFilter, NucleoInput};
use service::pagination::{ListParams, Page};
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, perm, soft_delete, toggle_status, ApiResult, CreatedResult};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/ciudades",
            perm("ciudades.read", get(list_ciudades)).merge(perm("ciudades.write", post(create_ciudad))),
        )
        .route(
            "/ciudades/:id",
            perm("ciudades.read", get(get_ciudad))
                .merge(perm("ciudades.write", put(update_ciudad).delete(soft_delete::<ciudad::Entity>))),
        )
        .route("/ciudades/:id/estado", perm("ciudades.write", patch(toggle_status::<ciudad::Entity>)))
        .route(
            "/distritos",
            perm("distritos.read", get(list_distritos)).merge(perm("distritos.write", post(create_distrito))),
        )
        .route(
            "/distritos/:id",
            perm("distritos.read", get(get_distrito))
                .merge(perm("distritos.write", put(update_distrito).delete(soft_delete::<distrito::Entity>))),
        )
        .route("/distritos/:id/estado", perm("distritos.write", patch(toggle_status::<distrito::Entity>)))
        .route(
            "/nucleos",
            perm("nucleos.read", get(list_nucleos)).merge(perm("nucleos.write", post(create_nucleo))),
        )
        .route(
            "/nucleos/:id",
            perm("nucleos.read", get(get_nucleo))
                .merge(perm("nucleos.write", put(update_nucleo).delete(soft_delete::<nucleo::Entity>))),
        )
        .route("/nucleos/:id/estado", perm("nucleos.write", patch(toggle_status::<nucleo::Entity>)))
}

#[utoipa::path(get, path = "/ciudades", tag = "geografia", params(crate::openapi::ListQuery), responses((status = 200, description = "Page of ciudades")))]
pub async fn list_ciudades(State(state): State<ServerState>, Query(params): Query<ListParams>) -> ApiResult<Page<ciudad::Model>> {
    Ok(Json(ciudad_service::list(&state.db, &params).await?))
}

async fn get_ciudad(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<ciudad::Model> {
    Ok(Json(ciudad_service::get(&state.db, id).await?))
}

async fn create_ciudad(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<CiudadInput>,
) -> CreatedResult<ciudad::Model> {
    Ok(created(ciudad_service::create(&state.db, user.id, input).await?))
}

async fn update_ciudad(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<CiudadInput>,
) -> ApiResult<ciudad::Model> {
    Ok(Json(ciudad_service::update(&state.db, user.id, id, input).await?))
}

async fn list_distritos(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<DistritoFilter>,
) -> ApiResult<Page<distrito::Model>> {
    Ok(Json(distrito_service::list(&state.db, &params, &filter).await?))
}

async fn get_distrito(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<distrito::Model> {
    Ok(Json(distrito_service::get(&state.db, id).await?))
}

async fn create_distrito(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<DistritoInput>,
) -> CreatedResult<distrito::Model> {
    Ok(created(distrito_service::create(&state.db, user.id, input).await?))
}

async fn update_distrito(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<DistritoInput>,
) -> ApiResult<distrito::Model> {
    Ok(Json(distrito_service::update(&state.db, user.id, id, input).await?))
}

async fn list_nucleos(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<NucleoFilter>,
) -> ApiResult<Page<nucleo::Model>> {
    Ok(Json(nucleo_service::list(&state.db, &params, &filter).await?))
}

async fn get_nucleo(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<nucleo::Model> {
    Ok(Json(nucleo_service::get(&state.db, id).await?))
}

async fn create_nucleo(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<NucleoInput>,
) -> CreatedResult<nucleo::Model> {
    Ok(created(nucleo_service::create(&state.db, user.id, input).await?))
}

async fn update_nucleo(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<NucleoInput>,
) -> ApiResult<nucleo::Model> {
    Ok(Json(nucleo_service::update(&state.db, user.id, id, input).await?))
}
