//! REST API endpoints for scan orchestration and status polling

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ApiError;
use crate::model::{RuleResult, ScanStatus};
use crate::service::{BatchScanEntry, BatchTarget, ScanService};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunScanRequest {
    pub target_url: String,
    /// When present the scan is session-tracked: a `scan_sessions` row is
    /// created before the audits and the findings are persisted as issues.
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunScanResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<Uuid>,
    pub results: Vec<RuleResult>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchScanRequest {
    pub org_id: Uuid,
    pub targets: Vec<BatchTarget>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchScanResponse {
    pub success: bool,
    pub scans: Vec<BatchScanEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatusResponse {
    pub scan_id: Uuid,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<i32>,
}

/// Run both audit engines against a target URL
#[utoipa::path(
    post,
    path = "/run-scan",
    request_body = RunScanRequest,
    responses(
        (status = 200, description = "Audit finished", body = RunScanResponse),
        (status = 400, description = "Invalid target URL"),
        (status = 500, description = "Audit failed")
    ),
    tag = "scans"
)]
#[post("/run-scan")]
pub async fn run_scan(
    service: web::Data<ScanService>,
    body: web::Json<RunScanRequest>,
) -> Result<impl Responder, ApiError> {
    let response = match body.project_id {
        Some(project_id) => {
            let (scan_id, results) = service.request_scan(&body.target_url, project_id).await?;
            RunScanResponse {
                success: true,
                scan_id: Some(scan_id),
                results,
            }
        }
        None => {
            let results = service.audit_only(&body.target_url).await?;
            RunScanResponse {
                success: true,
                scan_id: None,
                results,
            }
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Dispatch one scan per target; failures get explicit per-target entries
#[utoipa::path(
    post,
    path = "/scans/batch",
    request_body = BatchScanRequest,
    responses(
        (status = 200, description = "Batch dispatched", body = BatchScanResponse)
    ),
    tag = "scans"
)]
#[post("/scans/batch")]
pub async fn submit_batch(
    service: web::Data<ScanService>,
    body: web::Json<BatchScanRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let scans = service.submit_batch(request.org_id, request.targets).await;

    HttpResponse::Ok().json(BatchScanResponse {
        success: true,
        scans,
    })
}

/// Poll a scan session's status
///
/// An unknown scan id reports `FAILED` rather than 404; callers stop
/// polling on any terminal status.
#[utoipa::path(
    get,
    path = "/scans/{scan_id}",
    params(
        ("scan_id" = Uuid, Path, description = "Scan session id")
    ),
    responses(
        (status = 200, description = "Session status", body = ScanStatusResponse),
        (status = 500, description = "Status lookup failed")
    ),
    tag = "scans"
)]
#[get("/scans/{scan_id}")]
pub async fn get_scan_status(
    service: web::Data<ScanService>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let scan_id = path.into_inner();
    let (status, overall_score) = service.get_scan_status(scan_id).await?;

    Ok(HttpResponse::Ok().json(ScanStatusResponse {
        scan_id,
        status,
        overall_score,
    }))
}

/// Configure scan routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(run_scan)
        .service(submit_batch)
        .service(get_scan_status);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_scan_request_accepts_worker_wire_shape() {
        let body: RunScanRequest =
            serde_json::from_str(r#"{"targetUrl": "https://example.com/"}"#).unwrap();
        assert_eq!(body.target_url, "https://example.com/");
        assert!(body.project_id.is_none());
    }

    #[test]
    fn status_response_omits_score_until_completion() {
        let response = ScanStatusResponse {
            scan_id: Uuid::new_v4(),
            status: ScanStatus::Progress,
            overall_score: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "PROGRESS");
        assert!(json.get("overallScore").is_none());
    }

    #[test]
    fn batch_request_parses_targets() {
        let raw = r#"{
            "orgId": "7b7c2f0e-9f6d-4a70-9a3b-0f8f6f8c2a11",
            "targets": [
                {"projectId": "4f8e2c3a-1b2d-4e5f-8a9b-0c1d2e3f4a5b", "url": "https://example.com/"}
            ]
        }"#;
        let body: BatchScanRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(body.targets.len(), 1);
        assert_eq!(body.targets[0].url, "https://example.com/");
    }
}
