use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use models::{ampliacion, baja, remodelacion};
use service::auth::domain::CurrentUser;
use service::movimientos::ampliacion_service::{self, AmpliacionInput, AmpliacionUpdate};
use service::movimientos::baja_service::{self, BajaInput};
use service::movimientos::remodelacion_service::{self, RemodelacionInput, RemodelacionUpdate};
use service::movimientos::MovimientoFilter;
use service::pagination::{ListParams, Page};
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, perm, ApiResult, CreatedResult, StatusBody};
use crate::errors::JsonApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/ampliaciones",
            perm("ampliaciones.read", get(list_ampliaciones)).merge(perm("ampliaciones.write", post(create_ampliacion))),
        )
        .route(
            "/ampliaciones/:id",
            perm("ampliaciones.read", get(get_ampliacion))
                .merge(perm("ampliaciones.write", put(update_ampliacion).delete(delete_ampliacion))),
        )
        .route("/ampliaciones/:id/estado", perm("ampliaciones.write", patch(toggle_ampliacion)))
        .route(
            "/remodelaciones",
            perm("remodelaciones.read", get(list_remodelaciones))
                .merge(perm("remodelaciones.write", post(create_remodelacion))),
        )
        .route(
            "/remodelaciones/:id",
            perm("remodelaciones.read", get(get_remodelacion))
                .merge(perm("remodelaciones.write", put(update_remodelacion).delete(delete_remodelacion))),
        )
        .route("/remodelaciones/:id/estado", perm("remodelaciones.write", patch(toggle_remodelacion)))
        .route("/bajas", perm("bajas.read", get(list_bajas)).merge(perm("bajas.write", post(register_baja))))
        .route("/bajas/:id", perm("bajas.read", get(get_baja)))
        .route("/bajas/:id/anular", perm("bajas.write", patch(annul_baja)))
}

async fn list_ampliaciones(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<MovimientoFilter>,
) -> ApiResult<Page<ampliacion::Model>> {
    Ok(Json(ampliacion_service::list(&state.db, &params, &filter).await?))
}

async fn get_ampliacion(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<ampliacion::Model> {
    Ok(Json(ampliacion_service::get(&state.db, id).await?))
}

async fn create_ampliacion(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<AmpliacionInput>,
) -> CreatedResult<ampliacion::Model> {
    Ok(created(ampliacion_service::create(&state.db, user.id, input).await?))
}

async fn update_ampliacion(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<AmpliacionUpdate>,
) -> ApiResult<ampliacion::Model> {
    Ok(Json(ampliacion_service::update(&state.db, user.id, id, input).await?))
}

async fn toggle_ampliacion(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusBody> {
    let status = ampliacion_service::toggle(&state.db, user.id, id).await?;
    Ok(Json(StatusBody { id, status }))
}

async fn delete_ampliacion(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    ampliacion_service::delete(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_remodelaciones(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<MovimientoFilter>,
) -> ApiResult<Page<remodelacion::Model>> {
    Ok(Json(remodelacion_service::list(&state.db, &params, &filter).await?))
}

async fn get_remodelacion(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<remodelacion::Model> {
    Ok(Json(remodelacion_service::get(&state.db, id).await?))
}

async fn create_remodelacion(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<RemodelacionInput>,
) -> CreatedResult<remodelacion::Model> {
    Ok(created(remodelacion_service::create(&state.db, user.id, input).await?))
}

async fn update_remodelacion(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<RemodelacionUpdate>,
) -> ApiResult<remodelacion::Model> {
    Ok(Json(remodelacion_service::update(&state.db, user.id, id, input).await?))
}

async fn toggle_remodelacion(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusBody> {
    let status = remodelacion_service::toggle(&state.db, user.id, id).await?;
    Ok(Json(StatusBody { id, status }))
}

async fn delete_remodelacion(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    remodelacion_service::delete(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/bajas", tag = "movimientos",
    params(crate::openapi::ListQuery, ("edificio_id" = Option<Uuid>, Query, description = "Filter by building")),
    responses((status = 200, description = "Page of bajas"))
)]
pub async fn list_bajas(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<MovimientoFilter>,
) -> ApiResult<Page<baja::Model>> {
    Ok(Json(baja_service::list(&state.db, &params, &filter).await?))
}

async fn get_baja(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<baja::Model> {
    Ok(Json(baja_service::get(&state.db, id).await?))
}

/// Retires the building together with the baja.
#[utoipa::path(
    post, path = "/bajas", tag = "movimientos",
    request_body = crate::openapi::BajaRequest,
    responses(
        (status = 201, description = "Baja registered, building set INACTIVO"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Building already retired"),
    )
)]
pub async fn register_baja(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<BajaInput>,
) -> CreatedResult<baja::Model> {
    Ok(created(baja_service::register(&state.db, user.id, input).await?))
}

#[utoipa::path(
    patch, path = "/bajas/{id}/anular", tag = "movimientos",
    params(("id" = Uuid, Path, description = "Baja id")),
    responses((status = 200, description = "Baja annulled, building back to ACTIVO"), (status = 409, description = "Already annulled"))
)]
pub async fn annul_baja(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<baja::Model> {
    Ok(Json(baja_service::annul(&state.db, user.id, id).await?))
}
