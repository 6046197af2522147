use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::Satellite;
use crate::ingestion::SyncReport;
use crate::web::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_objects: usize,
    pub timestamp: DateTime<Utc>,
}

/// Trigger a full catalog sync from Space-Track.
#[utoipa::path(
    post,
    path = "/api/v1/catalog/sync",
    tag = "catalog",
    responses(
        (status = 200, description = "Sync completed", body = SyncReport),
        (status = 500, description = "Sync failed", body = SyncReport)
    )
)]
pub async fn sync(State(state): State<AppState>) -> Response {
    let report = state.ingestion.sync().await;
    let status = if report.successful {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/stats",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats)
    )
)]
pub async fn stats(State(state): State<AppState>) -> Json<CatalogStats> {
    Json(CatalogStats {
        total_objects: state.catalog.count(),
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/{cat_id}",
    tag = "catalog",
    params(
        ("cat_id" = u32, Path, description = "NORAD catalog number")
    ),
    responses(
        (status = 200, description = "Satellite", body = Satellite),
        (status = 404, description = "Not in catalog", body = ErrorResponse)
    )
)]
pub async fn get_satellite(
    State(state): State<AppState>,
    Path(cat_id): Path<u32>,
) -> ApiResult<Json<Satellite>> {
    state
        .catalog
        .find(cat_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("satellite {} not in catalog", cat_id)))
}
