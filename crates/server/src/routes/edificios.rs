use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use models::edificio;
use serde::Deserialize;
use service::auth::domain::CurrentUser;
use service::edificio_service::{self, EdificioFilter, EdificioInput, History};
use service::pagination::{ListParams, Page};
use service::report::exports;
use service::valuation::Valuation;
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, pdf_download, perm, ApiResult, CreatedResult, StatusBody};
use crate::errors::JsonApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/edificios", perm("edificios.read", get(list_edificios)).merge(perm("edificios.write", post(create_edificio))))
        .route("/edificios/exportar/pdf", perm("edificios.export", get(export_edificios)))
        .route(
            "/edificios/:id",
            perm("edificios.read", get(get_edificio))
                .merge(perm("edificios.write", put(update_edificio).delete(delete_edificio))),
        )
        .route("/edificios/:id/estado", perm("edificios.write", patch(toggle_edificio)))
        .route("/edificios/:id/historial", perm("edificios.read", get(edificio_history)))
        .route("/edificios/:id/valoracion", perm("edificios.read", get(edificio_valuation)))
}

#[utoipa::path(
    get, path = "/edificios", tag = "edificios",
    params(
        crate::openapi::ListQuery,
        ("nucleo_id" = Option<Uuid>, Query, description = "Filter by nucleo"),
        ("auxiliar_id" = Option<Uuid>, Query, description = "Filter by auxiliar contable"),
        ("unidad_organizacional_id" = Option<Uuid>, Query, description = "Filter by unidad organizacional"),
    ),
    responses((status = 200, description = "Page of edificios"), (status = 403, description = "Forbidden"))
)]
pub async fn list_edificios(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<EdificioFilter>,
) -> ApiResult<Page<edificio::Model>> {
    Ok(Json(edificio_service::list(&state.db, &params, &filter).await?))
}

#[utoipa::path(
    get, path = "/edificios/exportar/pdf", tag = "edificios",
    params(crate::openapi::ListQuery),
    responses((status = 200, description = "PDF", content_type = "application/pdf"))
)]
pub async fn export_edificios(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<EdificioFilter>,
) -> Result<Response, JsonApiError> {
    let table = exports::edificios_report(&state.db, &params, &filter).await?;
    pdf_download(&state, table, "edificios").await
}

async fn get_edificio(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<edificio::Model> {
    Ok(Json(edificio_service::get(&state.db, id).await?))
}

async fn create_edificio(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<EdificioInput>,
) -> CreatedResult<edificio::Model> {
    Ok(created(edificio_service::create(&state.db, user.id, input).await?))
}

async fn update_edificio(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<EdificioInput>,
) -> ApiResult<edificio::Model> {
    Ok(Json(edificio_service::update(&state.db, user.id, id, input).await?))
}

async fn toggle_edificio(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusBody> {
    let status = edificio_service::toggle(&state.db, user.id, id).await?;
    Ok(Json(StatusBody { id, status }))
}

async fn delete_edificio(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    edificio_service::delete(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/edificios/{id}/historial", tag = "edificios",
    params(("id" = Uuid, Path, description = "Edificio id")),
    responses((status = 200, description = "Ampliaciones, remodelaciones and bajas of the building"), (status = 404, description = "Not Found"))
)]
pub async fn edificio_history(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<History> {
    Ok(Json(edificio_service::history(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ValuationQuery {
    pub fecha: Option<NaiveDate>,
}

#[utoipa::path(
    get, path = "/edificios/{id}/valoracion", tag = "edificios",
    params(
        ("id" = Uuid, Path, description = "Edificio id"),
        ("fecha" = Option<NaiveDate>, Query, description = "Valuation day, defaults to today"),
    ),
    responses(
        (status = 200, description = "Restated value"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Building or UFV not found"),
    )
)]
pub async fn edificio_valuation(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(q): Query<ValuationQuery>,
) -> ApiResult<Valuation> {
    Ok(Json(edificio_service::valuation(&state.db, id, q.fecha).await?))
}
