use utoipa::OpenApi;

use crate::catalog::Satellite;
use crate::conjunction::{Conjunction, Page};
use crate::ingestion::SyncReport;
use crate::screening::ScreeningReport;

use super::api::catalog::CatalogStats;
use super::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::api::catalog::sync,
        crate::web::api::catalog::stats,
        crate::web::api::catalog::get_satellite,
        crate::web::api::conjunctions::list,
        crate::web::api::conjunctions::screen,
    ),
    components(
        schemas(
            Satellite,
            SyncReport,
            CatalogStats,
            Conjunction,
            Page<Conjunction>,
            ScreeningReport,
            ErrorResponse,
        )
    ),
    info(
        title = "Conjscan API",
        description = "Satellite catalog ingestion and conjunction screening",
        version = "0.1.0"
    ),
    tags(
        (name = "catalog", description = "Catalog ingestion and lookup"),
        (name = "conjunctions", description = "Conjunction screening and results")
    )
)]
pub struct ApiDoc;
