//! Repository for scan session and issue database operations

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{NewIssue, ScanSessionRow};
use super::DbError;
use crate::model::{RuleResult, ScanStatus};

/// Repository for scan session operations.
///
/// Writes are per-scan-id and never contend across sessions; the terminal
/// status transition is always the last write for a session.
#[derive(Clone)]
pub struct ScanRepository {
    pool: PgPool,
}

impl ScanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a session row in `PROGRESS` and return its generated id.
    ///
    /// The row is persisted before any audit runs so a pollable scan id
    /// exists even if the audits subsequently fail.
    pub async fn create_session(&self, project_id: Uuid) -> Result<Uuid, DbError> {
        let scan_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO scan_sessions (scan_id, project_id, status, started_at, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(scan_id)
        .bind(project_id)
        .bind(ScanStatus::Progress.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::debug!(scan_id = %scan_id, project_id = %project_id, "Created scan session");
        Ok(scan_id)
    }

    /// Finalize a session as completed with its computed score.
    pub async fn complete_session(&self, scan_id: Uuid, overall_score: i32) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE scan_sessions
            SET status = $2, overall_score = $3, finished_at = NOW()
            WHERE scan_id = $1
            "#,
        )
        .bind(scan_id)
        .bind(ScanStatus::Completed.as_str())
        .bind(overall_score)
        .execute(&self.pool)
        .await?;

        tracing::debug!(scan_id = %scan_id, overall_score, "Scan session completed");
        Ok(())
    }

    /// Finalize a session as failed. The score stays NULL.
    pub async fn fail_session(&self, scan_id: Uuid) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE scan_sessions
            SET status = $2, finished_at = NOW()
            WHERE scan_id = $1
            "#,
        )
        .bind(scan_id)
        .bind(ScanStatus::Failed.as_str())
        .execute(&self.pool)
        .await?;

        tracing::debug!(scan_id = %scan_id, "Scan session marked failed");
        Ok(())
    }

    /// Fetch a full session row. `None` when no row exists for the id.
    pub async fn get_session(&self, scan_id: Uuid) -> Result<Option<ScanSessionRow>, DbError> {
        let row: Option<ScanSessionRow> =
            sqlx::query_as("SELECT * FROM scan_sessions WHERE scan_id = $1")
                .bind(scan_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row)
    }

    /// Bulk-insert the normalized findings for a session.
    ///
    /// All rows go in one transaction: a session has either all of its
    /// issues or none, never a partial set.
    pub async fn insert_issues(
        &self,
        scan_id: Uuid,
        results: &[RuleResult],
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for result in results {
            let issue = NewIssue::from(result);
            sqlx::query(
                r#"
                INSERT INTO a11y_issues (
                    issue_id, scan_id, rule_id, severity,
                    element_selector, description, raw_detail, created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(scan_id)
            .bind(&issue.rule_id)
            .bind(&issue.severity)
            .bind(&issue.element_selector)
            .bind(&issue.description)
            .bind(&issue.raw_detail)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(scan_id = %scan_id, count = results.len(), "Inserted scan issues");
        Ok(())
    }
}
