//! Pure mapping from raw engine output to the canonical [`RuleResult`] model
//!
//! Both normalizers are side-effect free. For one target the orchestrator
//! always emits axe findings before Lighthouse findings.

mod axe;
mod lighthouse;

pub use axe::normalize_axe_results;
pub use lighthouse::normalize_lighthouse_audits;

/// Build a source-prefixed canonical rule id: upper-cased, with every
/// non-alphanumeric character replaced by an underscore.
pub(crate) fn prefixed_rule_id(prefix: &str, raw: &str) -> String {
    let normalized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", prefix, normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_are_upper_cased_and_underscored() {
        assert_eq!(prefixed_rule_id("AXE_", "image-alt"), "AXE_IMAGE_ALT");
        assert_eq!(
            prefixed_rule_id("LH_", "logical-tab-order"),
            "LH_LOGICAL_TAB_ORDER"
        );
        assert_eq!(prefixed_rule_id("AXE_", "aria.valid"), "AXE_ARIA_VALID");
    }
}
