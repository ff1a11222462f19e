//! Canonical scan domain types shared across the crawler, audit engines,
//! normalizers and the orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use utoipa::ToSchema;

/// Severity of an accessibility violation, used for filtering and scoring.
///
/// Axe reports this natively as its `impact`; Lighthouse findings are mapped
/// to a uniform [`Severity::Serious`] because the engine exposes nothing finer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Serious => "serious",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which audit engine produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    Axe,
    Lighthouse,
}

/// The unified violation record both engines' outputs converge to.
///
/// `rule_id` is source-prefixed (`AXE_<RULE>` / `LH_<RULE>`) so the identifier
/// space stays collision-free across engines. Axe contributes one record per
/// affected DOM node; Lighthouse contributes at most one per failing audit id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub rule_id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// DOM selector for the affected element. Always `None` for Lighthouse,
    /// which reports page-level audits only.
    pub selector: Option<String>,
    pub source: RuleSource,
    pub help_url: Option<String>,
}

/// A page discovered by the crawler. Ephemeral: lives only inside one crawl
/// response and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CrawledPage {
    pub title: String,
    pub url: String,
}

/// Scan session lifecycle.
///
/// `Ready` is the initial database default; `request_scan` moves a session
/// straight to `Progress` before any audit runs. `Completed` and `Failed` are
/// terminal and never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanStatus {
    Ready,
    Progress,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Ready => "READY",
            ScanStatus::Progress => "PROGRESS",
            ScanStatus::Completed => "COMPLETED",
            ScanStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Raw engine output shapes. Transient: discarded after normalization.
// ---------------------------------------------------------------------------

/// One DOM node affected by an axe violation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxeNode {
    #[serde(default)]
    pub html: Option<String>,
    /// CSS selector path segments identifying the element.
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default)]
    pub failure_summary: Option<String>,
}

/// One axe-core rule violation, possibly affecting many nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxeViolation {
    pub id: String,
    /// Absent for some rules; the normalizer defaults it to `moderate`.
    #[serde(default)]
    pub impact: Option<Severity>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub help_url: Option<String>,
    #[serde(default)]
    pub nodes: Vec<AxeNode>,
}

/// Full axe-core run output. Only `violations` is consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxeResults {
    #[serde(default)]
    pub violations: Vec<AxeViolation>,
}

/// One Lighthouse audit result, keyed by audit id in the report's `audits` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseAudit {
    /// 1.0 means the audit passed and is not reported.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub help_url: Option<String>,
}

/// Raw Lighthouse accessibility report: audit-id to result.
pub type LighthouseAudits = HashMap<String, LighthouseAudit>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_deserializes_from_axe_impact_strings() {
        let sev: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(sev, Severity::Critical);
        let sev: Severity = serde_json::from_str("\"moderate\"").unwrap();
        assert_eq!(sev, Severity::Moderate);
    }

    #[test]
    fn scan_status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&ScanStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
        assert_eq!(
            serde_json::to_string(&ScanStatus::Progress).unwrap(),
            "\"PROGRESS\""
        );
    }

    #[test]
    fn rule_result_wire_format_is_camel_case() {
        let result = RuleResult {
            rule_id: "AXE_IMAGE_ALT".to_string(),
            title: "Images must have alternate text".to_string(),
            description: "Ensures <img> elements have alternate text".to_string(),
            severity: Severity::Moderate,
            selector: Some("img.hero".to_string()),
            source: RuleSource::Axe,
            help_url: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ruleId"], "AXE_IMAGE_ALT");
        assert_eq!(json["severity"], "moderate");
        assert_eq!(json["source"], "axe");
        assert!(json["helpUrl"].is_null());
    }

    #[test]
    fn axe_violation_tolerates_null_impact() {
        let raw = r#"{
            "id": "image-alt",
            "impact": null,
            "description": "d",
            "help": "h",
            "helpUrl": "https://dequeuniversity.com/rules/axe/4.8/image-alt",
            "nodes": [{"html": "<img>", "target": ["img"], "failureSummary": "Fix this"}]
        }"#;
        let violation: AxeViolation = serde_json::from_str(raw).unwrap();
        assert!(violation.impact.is_none());
        assert_eq!(violation.nodes.len(), 1);
        assert_eq!(violation.nodes[0].target, vec!["img"]);
    }

    #[test]
    fn lighthouse_audit_tolerates_sparse_fields() {
        let raw = r#"{"score": 0.5, "title": "Keyboard"}"#;
        let audit: LighthouseAudit = serde_json::from_str(raw).unwrap();
        assert_eq!(audit.score, Some(0.5));
        assert!(audit.explanation.is_none());
        assert!(audit.description.is_none());
    }
}
