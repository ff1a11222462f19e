//! Scan orchestration: crawl targets through audit, normalize, persist, score
//!
//! Session lifecycle: `PROGRESS` on creation (before any audit), then
//! `COMPLETED` with a score or `FAILED` with the score left NULL. No
//! automatic retry; a failed scan is resubmitted as a new session.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::repository::ScanRepository;
use crate::db::DbError;
use crate::engine::{AuditEngine, AxeEngine, EngineError, LighthouseEngine};
use crate::model::{EngineConfig, RuleResult, ScanStatus};

/// Linear per-issue penalty applied to a perfect score of 100.
const SCORE_PENALTY_PER_ISSUE: i64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ScanServiceError {
    #[error("invalid target url: {0}")]
    InvalidInput(String),

    #[error("audit failed: {0}")]
    Audit(#[from] EngineError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] DbError),
}

/// One target in a batch submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchTarget {
    pub project_id: Uuid,
    pub url: String,
}

/// Per-target batch outcome: either a dispatched scan or an explicit error.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchScanEntry {
    pub project_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScanStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Orchestrates scan sessions across the registered audit engines.
///
/// Engines run in registration order (axe first, then Lighthouse), so for
/// one target axe findings always precede Lighthouse findings.
#[derive(Clone)]
pub struct ScanService {
    repository: ScanRepository,
    engines: Vec<Arc<dyn AuditEngine>>,
}

impl ScanService {
    pub fn new(repository: ScanRepository, config: &EngineConfig) -> Self {
        Self {
            repository,
            engines: vec![
                Arc::new(AxeEngine::new(config)),
                Arc::new(LighthouseEngine::new(config)),
            ],
        }
    }

    /// Audit a target without session tracking and return the findings.
    pub async fn audit_only(&self, url: &str) -> Result<Vec<RuleResult>, ScanServiceError> {
        let target = parse_target_url(url)?;
        self.run_audits(&target).await
    }

    /// Run a fully tracked scan: session row first, then audits, then a
    /// transactional issue insert and the terminal status transition.
    ///
    /// Returns the session id with the normalized findings. Any failure
    /// after session creation marks the session `FAILED` and re-raises.
    pub async fn request_scan(
        &self,
        url: &str,
        project_id: Uuid,
    ) -> Result<(Uuid, Vec<RuleResult>), ScanServiceError> {
        let target = parse_target_url(url)?;
        let scan_id = self.repository.create_session(project_id).await?;

        let results = self.execute_and_finalize(scan_id, &target).await?;
        Ok((scan_id, results))
    }

    /// Status for a polling caller, with the score once the session has
    /// completed. A missing session reads as `FAILED`, never as an error:
    /// a caller racing the insert of a just-created id must not see a hard
    /// failure.
    pub async fn get_scan_status(
        &self,
        scan_id: Uuid,
    ) -> Result<(ScanStatus, Option<i32>), ScanServiceError> {
        match self.repository.get_session(scan_id).await? {
            Some(row) => Ok((row.status(), row.overall_score)),
            None => Ok((ScanStatus::Failed, None)),
        }
    }

    /// Dispatch one scan per target. Each target runs as an independent
    /// task; one target's failure never aborts the others. Every submitted
    /// target gets an explicit entry in the response, in input order.
    pub async fn submit_batch(
        &self,
        org_id: Uuid,
        targets: Vec<BatchTarget>,
    ) -> Vec<BatchScanEntry> {
        tracing::info!(org_id = %org_id, targets = targets.len(), "Batch scan submitted");

        let mut entries = Vec::with_capacity(targets.len());
        for target in targets {
            let project_id = target.project_id;
            match self.dispatch(target).await {
                Ok(scan_id) => entries.push(BatchScanEntry {
                    project_id,
                    scan_id: Some(scan_id),
                    status: Some(ScanStatus::Progress),
                    error: None,
                }),
                Err(e) => {
                    tracing::error!(org_id = %org_id, project_id = %project_id, error = %e, "Failed to dispatch scan target");
                    entries.push(BatchScanEntry {
                        project_id,
                        scan_id: None,
                        status: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        entries
    }

    /// Create the session synchronously (so the caller can poll it), then
    /// run the audits on a detached task.
    async fn dispatch(&self, target: BatchTarget) -> Result<Uuid, ScanServiceError> {
        let url = parse_target_url(&target.url)?;
        let scan_id = self.repository.create_session(target.project_id).await?;

        let service = self.clone();
        tokio::spawn(async move {
            let _ = service.execute_and_finalize(scan_id, &url).await;
        });

        Ok(scan_id)
    }

    async fn execute_and_finalize(
        &self,
        scan_id: Uuid,
        target: &Url,
    ) -> Result<Vec<RuleResult>, ScanServiceError> {
        match self.execute(scan_id, target).await {
            Ok(results) => Ok(results),
            Err(e) => {
                tracing::error!(scan_id = %scan_id, url = %target, error = %e, "Scan failed");
                if let Err(db_err) = self.repository.fail_session(scan_id).await {
                    tracing::error!(scan_id = %scan_id, error = %db_err, "Failed to mark session as failed");
                }
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        scan_id: Uuid,
        target: &Url,
    ) -> Result<Vec<RuleResult>, ScanServiceError> {
        let results = self.run_audits(target).await?;

        // No partial persistence: issues land only after every audit is done
        self.repository.insert_issues(scan_id, &results).await?;
        let score = overall_score(results.len());
        self.repository.complete_session(scan_id, score).await?;

        tracing::info!(
            scan_id = %scan_id,
            url = %target,
            issues = results.len(),
            score,
            "Scan completed"
        );
        Ok(results)
    }

    async fn run_audits(&self, target: &Url) -> Result<Vec<RuleResult>, ScanServiceError> {
        let mut results = Vec::new();
        for engine in &self.engines {
            let findings = engine.audit(target).await?;
            tracing::debug!(
                engine = engine.name(),
                url = %target,
                findings = findings.len(),
                "Engine audit finished"
            );
            results.extend(findings);
        }
        Ok(results)
    }
}

/// Validate a scan target before launching any browser.
fn parse_target_url(raw: &str) -> Result<Url, ScanServiceError> {
    let url = Url::parse(raw).map_err(|_| ScanServiceError::InvalidInput(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScanServiceError::InvalidInput(raw.to_string()));
    }
    Ok(url)
}

/// Severity-agnostic scoring policy: 100 minus a flat per-issue penalty,
/// floored at zero.
pub fn overall_score(issue_count: usize) -> i32 {
    (100 - SCORE_PENALTY_PER_ISSUE * issue_count as i64).max(0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleSource, Severity};
    use async_trait::async_trait;

    struct StaticEngine {
        name: &'static str,
        results: Vec<RuleResult>,
    }

    #[async_trait]
    impl AuditEngine for StaticEngine {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn audit(&self, _url: &Url) -> Result<Vec<RuleResult>, EngineError> {
            Ok(self.results.clone())
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl AuditEngine for FailingEngine {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn audit(&self, url: &Url) -> Result<Vec<RuleResult>, EngineError> {
            Err(EngineError::PageBlocked(url.to_string()))
        }
    }

    fn finding(rule_id: &str, source: RuleSource) -> RuleResult {
        RuleResult {
            rule_id: rule_id.to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            severity: Severity::Moderate,
            selector: None,
            source,
            help_url: None,
        }
    }

    async fn test_service(engines: Vec<Arc<dyn AuditEngine>>) -> (ScanService, sqlx::PgPool) {
        let pool = crate::db::create_pool().await.expect("pool");
        crate::db::init_schema(&pool).await.expect("schema");
        let service = ScanService {
            repository: ScanRepository::new(pool.clone()),
            engines,
        };
        (service, pool)
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn completed_scan_persists_issues_and_score() {
        let axe = StaticEngine {
            name: "axe",
            results: vec![
                finding("AXE_IMAGE_ALT", RuleSource::Axe),
                finding("AXE_IMAGE_ALT", RuleSource::Axe),
            ],
        };
        let lighthouse = StaticEngine {
            name: "lighthouse",
            results: vec![finding("LH_COLOR_CONTRAST", RuleSource::Lighthouse)],
        };
        let (service, pool) =
            test_service(vec![Arc::new(axe), Arc::new(lighthouse)]).await;

        let (scan_id, results) = service
            .request_scan("https://example.com/", Uuid::new_v4())
            .await
            .unwrap();

        // Axe findings precede Lighthouse findings
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].rule_id, "LH_COLOR_CONTRAST");

        let (status, score) = service.get_scan_status(scan_id).await.unwrap();
        assert_eq!(status, ScanStatus::Completed);
        assert_eq!(score, Some(85));

        let issue_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM a11y_issues WHERE scan_id = $1")
                .bind(scan_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(issue_count, 3);
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn engine_failure_after_first_audit_leaves_no_issues() {
        let axe = StaticEngine {
            name: "axe",
            results: vec![
                finding("AXE_IMAGE_ALT", RuleSource::Axe),
                finding("AXE_LABEL", RuleSource::Axe),
                finding("AXE_LINK_NAME", RuleSource::Axe),
            ],
        };
        let (service, pool) = test_service(vec![Arc::new(axe), Arc::new(FailingEngine)]).await;

        let result = service
            .request_scan("https://example.com/", Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(ScanServiceError::Audit(_))));

        // The session row exists and reads FAILED with no score; persistence
        // is all-or-nothing, so the axe findings never landed.
        let scan_id: Uuid =
            sqlx::query_scalar("SELECT scan_id FROM scan_sessions ORDER BY created_at DESC LIMIT 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        let (status, score) = service.get_scan_status(scan_id).await.unwrap();
        assert_eq!(status, ScanStatus::Failed);
        assert!(score.is_none());

        let issue_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM a11y_issues WHERE scan_id = $1")
                .bind(scan_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(issue_count, 0);
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn unknown_scan_id_reads_as_failed() {
        let (service, _pool) = test_service(Vec::new()).await;
        let (status, score) = service.get_scan_status(Uuid::new_v4()).await.unwrap();
        assert_eq!(status, ScanStatus::Failed);
        assert!(score.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires PostgreSQL
    async fn batch_isolates_per_target_failures() {
        let axe = StaticEngine {
            name: "axe",
            results: Vec::new(),
        };
        let (service, _pool) = test_service(vec![Arc::new(axe)]).await;

        let good = Uuid::new_v4();
        let bad = Uuid::new_v4();
        let entries = service
            .submit_batch(
                Uuid::new_v4(),
                vec![
                    BatchTarget {
                        project_id: good,
                        url: "https://example.com/".to_string(),
                    },
                    BatchTarget {
                        project_id: bad,
                        url: "not a url".to_string(),
                    },
                ],
            )
            .await;

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].project_id, good);
        assert!(entries[0].scan_id.is_some());
        assert_eq!(entries[0].status, Some(ScanStatus::Progress));
        assert_eq!(entries[1].project_id, bad);
        assert!(entries[1].scan_id.is_none());
        assert!(entries[1].error.is_some());
    }

    #[test]
    fn score_is_linear_in_issue_count() {
        assert_eq!(overall_score(0), 100);
        assert_eq!(overall_score(1), 95);
        assert_eq!(overall_score(3), 85);
        assert_eq!(overall_score(20), 0);
    }

    #[test]
    fn score_floors_at_zero() {
        assert_eq!(overall_score(21), 0);
        assert_eq!(overall_score(1000), 0);
    }

    #[test]
    fn target_url_validation_rejects_malformed_input() {
        assert!(matches!(
            parse_target_url("not-a-url"),
            Err(ScanServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_target_url("file:///etc/passwd"),
            Err(ScanServiceError::InvalidInput(_))
        ));
        assert!(parse_target_url("https://example.com/page").is_ok());
    }
}
