//! Lighthouse audit normalization

use super::prefixed_rule_id;
use crate::model::{LighthouseAudits, RuleResult, RuleSource, Severity};

/// The fixed allow-list of accessibility-relevant Lighthouse audit ids.
/// Audits outside this list are ignored even when present in the report.
pub const LIGHTHOUSE_TARGET_AUDITS: [&str; 6] = [
    "color-contrast",
    "keyboard",
    "focus-visible",
    "logical-tab-order",
    "link-name",
    "heading-order",
];

/// Fallback description when the engine supplies neither an explanation nor
/// a description.
const GENERIC_DESCRIPTION: &str = "Accessibility requirement not met";

/// Map failing allow-listed Lighthouse audits into canonical records.
///
/// A score of exactly 1 means the audit passed and is excluded. Lighthouse
/// has no element-level selectors and no per-finding severity scale, so
/// every reported finding is page-level `serious`.
pub fn normalize_lighthouse_audits(audits: &LighthouseAudits) -> Vec<RuleResult> {
    let mut results = Vec::new();

    for id in LIGHTHOUSE_TARGET_AUDITS {
        let Some(audit) = audits.get(id) else {
            continue;
        };

        if audit.score == Some(1.0) {
            continue;
        }

        let description = audit
            .explanation
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| audit.description.clone().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| GENERIC_DESCRIPTION.to_string());

        results.push(RuleResult {
            rule_id: prefixed_rule_id("LH_", id),
            title: audit.title.clone(),
            description,
            severity: Severity::Serious,
            selector: None,
            source: RuleSource::Lighthouse,
            help_url: audit.help_url.clone(),
        });
    }

    results
}
