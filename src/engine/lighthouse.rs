//! Lighthouse audit engine
//!
//! Drives the Lighthouse CLI, which launches and manages its own headless
//! Chrome process (a lifecycle separate from the axe engine's browser).
//! Evaluation is restricted to the accessibility category to bound latency.

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use url::Url;

use super::{run_engine_command, AuditEngine, EngineError};
use crate::model::{CommandConfig, EngineConfig, LighthouseAudits, RuleResult};
use crate::normalize::normalize_lighthouse_audits;

pub struct LighthouseEngine {
    command: CommandConfig,
    timeout: Duration,
}

impl LighthouseEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            command: config.lighthouse.clone(),
            timeout: config.navigation_timeout(),
        }
    }

    /// Run Lighthouse against `url` and return the raw `audits` map.
    ///
    /// Returns `None` only when the engine produced no report; that is
    /// propagated, not retried.
    pub async fn run_raw(&self, url: &Url) -> Result<Option<LighthouseAudits>, EngineError> {
        tracing::debug!(url = %url, program = %self.command.program, "Running Lighthouse audit");

        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .arg(url.as_str())
            .arg("--only-categories=accessibility")
            .arg("--output=json")
            .arg("--output-path=stdout")
            .arg("--quiet")
            .arg("--chrome-flags=--headless --no-sandbox");

        let output = run_engine_command(cmd, url, self.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Engine(format!(
                "lighthouse exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_lighthouse_output(&stdout)
    }
}

/// Parse Lighthouse CLI stdout into the report's `audits` map.
fn parse_lighthouse_output(raw: &str) -> Result<Option<LighthouseAudits>, EngineError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| EngineError::Parse(format!("invalid lighthouse JSON: {}", e)))?;

    let Some(audits) = value.get("audits") else {
        return Ok(None);
    };

    let audits: LighthouseAudits = serde_json::from_value(audits.clone())
        .map_err(|e| EngineError::Parse(format!("unexpected lighthouse audits shape: {}", e)))?;

    Ok(Some(audits))
}

#[async_trait]
impl AuditEngine for LighthouseEngine {
    fn name(&self) -> &'static str {
        "lighthouse"
    }

    async fn audit(&self, url: &Url) -> Result<Vec<RuleResult>, EngineError> {
        match self.run_raw(url).await? {
            Some(audits) => {
                tracing::debug!(url = %url, audits = audits.len(), "Lighthouse audit finished");
                Ok(normalize_lighthouse_audits(&audits))
            }
            None => {
                tracing::warn!(url = %url, "Lighthouse produced no report");
                Ok(Vec::new())
            }
        }
    }
}
