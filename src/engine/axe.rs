//! Axe-core audit engine
//!
//! Drives the axe CLI, which loads the target page in a headless browser,
//! injects the axe-core rule engine into the document and executes its full
//! default rule set. The engine internals are opaque; only the `violations`
//! array of its JSON report is consumed.

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use url::Url;

use super::{run_engine_command, AuditEngine, EngineError, DESKTOP_USER_AGENT};
use crate::model::{AxeResults, CommandConfig, EngineConfig, RuleResult};
use crate::normalize::normalize_axe_results;

pub struct AxeEngine {
    command: CommandConfig,
    timeout: Duration,
}

impl AxeEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            command: config.axe.clone(),
            timeout: config.navigation_timeout(),
        }
    }

    /// Run the axe CLI against `url` and return its raw violation report.
    pub async fn run_raw(&self, url: &Url) -> Result<AxeResults, EngineError> {
        tracing::debug!(url = %url, program = %self.command.program, "Running axe audit");

        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .arg(url.as_str())
            .arg("--stdout")
            .arg(chrome_options());

        let output = run_engine_command(cmd, url, self.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Engine(format!(
                "axe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_axe_output(&stdout)
    }
}

/// Build the `--chrome-options` flag for the axe CLI.
///
/// The CLI splits the value on commas before handing each entry to Chrome,
/// so the user agent must not contain one; the comma in `(KHTML, like Gecko)`
/// would otherwise truncate the flag mid-string.
fn chrome_options() -> String {
    let user_agent = DESKTOP_USER_AGENT.replace(',', "");
    format!("--chrome-options=no-sandbox,user-agent={}", user_agent)
}

/// Parse axe CLI stdout.
///
/// The CLI wraps the run result in a one-element array; a plain object is
/// accepted too so the engine command can be pointed at other axe frontends.
fn parse_axe_output(raw: &str) -> Result<AxeResults, EngineError> {
    let value: serde_json::Value = serde_json::from_str(raw.trim())
        .map_err(|e| EngineError::Parse(format!("invalid axe JSON: {}", e)))?;

    let value = match value {
        serde_json::Value::Array(mut items) if !items.is_empty() => items.remove(0),
        serde_json::Value::Array(_) => {
            return Err(EngineError::Parse("empty axe result array".to_string()))
        }
        other => other,
    };

    serde_json::from_value(value)
        .map_err(|e| EngineError::Parse(format!("unexpected axe result shape: {}", e)))
}

#[async_trait]
impl AuditEngine for AxeEngine {
    fn name(&self) -> &'static str {
        "axe"
    }

    async fn audit(&self, url: &Url) -> Result<Vec<RuleResult>, EngineError> {
        let results = self.run_raw(url).await?;
        tracing::debug!(
            url = %url,
            violations = results.violations.len(),
            "Axe audit finished"
        );
        Ok(normalize_axe_results(&results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleSource, Severity};

    const SAMPLE_REPORT: &str = r##"{
        "violations": [{
            "id": "image-alt",
            "impact": "critical",
            "description": "Ensures <img> elements have alternate text",
            "help": "Images must have alternate text",
            "helpUrl": "https://dequeuniversity.com/rules/axe/4.8/image-alt",
            "nodes": [
                {"html": "<img src=\"a.png\">", "target": ["#main", "img:nth-child(1)"]},
                {"html": "<img src=\"b.png\">", "target": ["#main", "img:nth-child(2)"]}
            ]
        }]
    }"##;

    #[test]
    fn chrome_options_survive_comma_splitting() {
        let options = chrome_options();
        let value = options.strip_prefix("--chrome-options=").unwrap();

        // The CLI comma-splits this value; the user agent must arrive as one
        // complete entry.
        let entries: Vec<&str> = value.split(',').collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], "no-sandbox");

        let user_agent = entries[1].strip_prefix("user-agent=").unwrap();
        assert!(user_agent.starts_with("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));
        assert!(user_agent.contains("Chrome/122.0.0.0"));
        assert!(user_agent.ends_with("Safari/537.36"));
    }

    #[test]
    fn parses_bare_object_report() {
        let results = parse_axe_output(SAMPLE_REPORT).unwrap();
        assert_eq!(results.violations.len(), 1);
        assert_eq!(results.violations[0].nodes.len(), 2);
    }

    #[test]
    fn parses_array_wrapped_report() {
        let wrapped = format!("[{}]", SAMPLE_REPORT);
        let results = parse_axe_output(&wrapped).unwrap();
        assert_eq!(results.violations.len(), 1);
    }

    #[test]
    fn rejects_malformed_output() {
        assert!(matches!(
            parse_axe_output("not json"),
            Err(EngineError::Parse(_))
        ));
        assert!(matches!(
            parse_axe_output("[]"),
            Err(EngineError::Parse(_))
        ));
    }

    fn echo_engine(report: &str) -> AxeEngine {
        // `sh -c` ignores the appended URL and flags (they become positional
        // parameters the script never reads), so the engine seam can be
        // exercised without a browser.
        AxeEngine {
            command: CommandConfig {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), format!("echo '{}'", report)],
            },
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn audit_runs_command_and_normalizes() {
        let engine = echo_engine(SAMPLE_REPORT);
        let url = Url::parse("https://example.com/").unwrap();

        let results = engine.audit(&url).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|r| r.rule_id == "AXE_IMAGE_ALT" && r.source == RuleSource::Axe));
        assert_eq!(results[0].severity, Severity::Critical);
        assert_eq!(results[0].selector.as_deref(), Some("#main img:nth-child(1)"));
    }

    #[tokio::test]
    async fn audit_surfaces_engine_exit_failure() {
        let engine = AxeEngine {
            command: CommandConfig {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "exit 3".to_string()],
            },
            timeout: Duration::from_secs(5),
        };
        let url = Url::parse("https://example.com/").unwrap();

        let result = engine.audit(&url).await;
        assert!(matches!(result, Err(EngineError::Engine(_))));
    }
}
