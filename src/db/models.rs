//! Database models for scan sessions and issues

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::model::{RuleResult, ScanStatus};

/// Database representation of a scan session
#[derive(Debug, Clone, FromRow)]
pub struct ScanSessionRow {
    pub scan_id: Uuid,
    pub project_id: Uuid,
    pub status: String,
    pub overall_score: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ScanSessionRow {
    pub fn status(&self) -> ScanStatus {
        scan_status_from_str(&self.status)
    }
}

/// Parse a stored status string. Unknown values map to `FAILED`: a session in
/// an unrecognizable state must never read as in-flight to a polling caller.
pub fn scan_status_from_str(raw: &str) -> ScanStatus {
    match raw {
        "READY" => ScanStatus::Ready,
        "PROGRESS" => ScanStatus::Progress,
        "COMPLETED" => ScanStatus::Completed,
        _ => ScanStatus::Failed,
    }
}

/// One issue row staged for bulk insert, derived from a normalized finding.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub rule_id: String,
    pub severity: String,
    pub element_selector: Option<String>,
    pub description: String,
    pub raw_detail: serde_json::Value,
}

impl From<&RuleResult> for NewIssue {
    fn from(result: &RuleResult) -> Self {
        Self {
            rule_id: result.rule_id.clone(),
            severity: result.severity.as_str().to_string(),
            element_selector: result.selector.clone(),
            description: result.description.clone(),
            raw_detail: serde_json::to_value(result).unwrap_or_default(),
        }
    }
}
