//! Axe result normalization

use super::prefixed_rule_id;
use crate::model::{AxeResults, RuleResult, RuleSource, Severity};

/// Flatten axe violations into canonical records, one per affected DOM node.
///
/// A single rule can affect many elements, so one violation may yield many
/// records. A missing `impact` defaults to `moderate`.
pub fn normalize_axe_results(results: &AxeResults) -> Vec<RuleResult> {
    let mut output = Vec::new();

    for violation in &results.violations {
        for node in &violation.nodes {
            output.push(RuleResult {
                rule_id: prefixed_rule_id("AXE_", &violation.id),
                title: violation.help.clone(),
                description: violation.description.clone(),
                severity: violation.impact.unwrap_or(Severity::Moderate),
                selector: Some(node.target.join(" ")),
                source: RuleSource::Axe,
                help_url: violation.help_url.clone(),
            });
        }
    }

    output
}
