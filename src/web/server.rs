use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::catalog::CatalogStore;
use crate::conjunction::ConjunctionStore;
use crate::ingestion::IngestionService;
use crate::screening::Screener;

use super::api::{catalog, conjunctions};
use super::api_doc::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub conjunctions: Arc<ConjunctionStore>,
    pub ingestion: Arc<IngestionService>,
    pub screener: Arc<Screener>,
}

pub async fn run_server(bind: &str, state: AppState) -> std::io::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/v1/catalog/sync", post(catalog::sync))
        .route("/api/v1/catalog/stats", get(catalog::stats))
        .route("/api/v1/catalog/{cat_id}", get(catalog::get_satellite))
        .route("/api/v1/conjunctions", get(conjunctions::list))
        .route("/api/v1/conjunctions/screen", post(conjunctions::screen))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    log::info!("Starting server on {}", bind);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await
}
