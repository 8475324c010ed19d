use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use models::ufv;
use service::auth::domain::CurrentUser;
use service::pagination::{ListParams, Page};
use service::report::exports;
use service::ufv_service::{self, UfvInput, UfvRange, UfvUpdate};
use uuid::Uuid;

use super::auth::ServerState;
use super::common::{created, pdf_download, perm, soft_delete, toggle_status, ApiResult, CreatedResult};
use crate::errors::JsonApiError;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/ufvs", perm("ufvs.read", get(list_ufvs)).merge(perm("ufvs.write", post(create_ufv))))
        .route("/ufvs/ultimo", perm("ufvs.read", get(latest_ufv)))
        .route("/ufvs/fecha/:date", perm("ufvs.read", get(ufv_by_date)))
        .route("/ufvs/exportar/pdf", perm("ufvs.export", get(export_ufvs)))
        .route(
            "/ufvs/:id",
            perm("ufvs.read", get(get_ufv)).merge(perm("ufvs.write", put(update_ufv).delete(soft_delete::<ufv::Entity>))),
        )
        .route("/ufvs/:id/estado", perm("ufvs.write", patch(toggle_status::<ufv::Entity>)))
}

#[utoipa::path(
    get, path = "/ufvs", tag = "ufv",
    params(
        crate::openapi::ListQuery,
        ("desde" = Option<NaiveDate>, Query, description = "First day, inclusive"),
        ("hasta" = Option<NaiveDate>, Query, description = "Last day, inclusive"),
    ),
    responses((status = 200, description = "Page of UFV values"), (status = 400, description = "Validation Error"))
)]
pub async fn list_ufvs(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(range): Query<UfvRange>,
) -> ApiResult<Page<ufv::Model>> {
    Ok(Json(ufv_service::list(&state.db, &params, &range).await?))
}

#[utoipa::path(get, path = "/ufvs/ultimo", tag = "ufv", responses((status = 200, description = "Most recent UFV"), (status = 404, description = "Not Found")))]
pub async fn latest_ufv(State(state): State<ServerState>) -> ApiResult<ufv::Model> {
    Ok(Json(ufv_service::latest(&state.db).await?))
}

#[utoipa::path(
    get, path = "/ufvs/fecha/{date}", tag = "ufv",
    params(("date" = NaiveDate, Path, description = "Day, YYYY-MM-DD")),
    responses((status = 200, description = "UFV of that day"), (status = 404, description = "Not Found"))
)]
pub async fn ufv_by_date(State(state): State<ServerState>, Path(date): Path<NaiveDate>) -> ApiResult<ufv::Model> {
    Ok(Json(ufv_service::by_date(&state.db, date).await?))
}

#[utoipa::path(
    get, path = "/ufvs/exportar/pdf", tag = "ufv",
    params(
        ("desde" = Option<NaiveDate>, Query, description = "First day, inclusive"),
        ("hasta" = Option<NaiveDate>, Query, description = "Last day, inclusive"),
    ),
    responses((status = 200, description = "PDF", content_type = "application/pdf"))
)]
pub async fn export_ufvs(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
    Query(range): Query<UfvRange>,
) -> Result<Response, JsonApiError> {
    let table = exports::ufvs_report(&state.db, &params, &range).await?;
    pdf_download(&state, table, "ufvs").await
}

async fn get_ufv(State(state): State<ServerState>, Path(id): Path<Uuid>) -> ApiResult<ufv::Model> {
    Ok(Json(ufv_service::get(&state.db, id).await?))
}

async fn create_ufv(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<UfvInput>,
) -> CreatedResult<ufv::Model> {
    Ok(created(ufv_service::create(&state.db, user.id, input).await?))
}

async fn update_ufv(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UfvUpdate>,
) -> ApiResult<ufv::Model> {
    Ok(Json(ufv_service::update(&state.db, user.id, id, input).await?))
}
