use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::conjunction::{Conjunction, Page};
use crate::screening::ScreeningReport;
use crate::web::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    50
}

#[utoipa::path(
    get,
    path = "/api/v1/conjunctions",
    tag = "conjunctions",
    params(
        ("page" = Option<usize>, Query, description = "Zero-based page index"),
        ("page_size" = Option<usize>, Query, description = "Rows per page (default 50)")
    ),
    responses(
        (status = 200, description = "Stored conjunctions, closest first", body = Page<Conjunction>)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Page<Conjunction>> {
    Json(state.conjunctions.get_conjunctions(query.page, query.page_size))
}

/// Run a screening pass over the current catalog. The pipeline is CPU-bound
/// and runs on the blocking pool.
#[utoipa::path(
    post,
    path = "/api/v1/conjunctions/screen",
    tag = "conjunctions",
    responses(
        (status = 200, description = "Screening completed", body = ScreeningReport),
        (status = 500, description = "Screening failed", body = ErrorResponse)
    )
)]
pub async fn screen(State(state): State<AppState>) -> ApiResult<Json<ScreeningReport>> {
    let screener = state.screener.clone();
    let report = tokio::task::spawn_blocking(move || screener.run(Utc::now()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(report))
}
