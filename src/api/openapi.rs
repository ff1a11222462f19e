//! OpenAPI specification endpoints

use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

use crate::model::{CrawledPage, RuleResult, RuleSource, ScanStatus, Severity};
use crate::service::{BatchScanEntry, BatchTarget};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::crawl::crawl,
        super::scan::run_scan,
        super::scan::submit_batch,
        super::scan::get_scan_status,
        super::health::liveness,
        super::health::readiness,
    ),
    components(schemas(
        super::crawl::CrawlRequest,
        super::crawl::CrawlResponse,
        super::scan::RunScanRequest,
        super::scan::RunScanResponse,
        super::scan::BatchScanRequest,
        super::scan::BatchScanResponse,
        super::scan::ScanStatusResponse,
        super::health::HealthStatus,
        super::health::ReadinessStatus,
        super::health::DependencyHealth,
        CrawledPage,
        RuleResult,
        RuleSource,
        ScanStatus,
        Severity,
        BatchTarget,
        BatchScanEntry,
    )),
    tags(
        (name = "crawl", description = "Page discovery"),
        (name = "scans", description = "Audit orchestration and status polling"),
        (name = "health", description = "Service health probes")
    ),
    info(
        title = "Accessibility Scan Worker API",
        description = "Crawl discovery, axe/Lighthouse audit orchestration and scan session tracking"
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
