//! Audit engines for running third-party accessibility checkers against a URL
//!
//! Each engine is an opaque external capability (`url -> raw results`) driven
//! as a child process. A new checker is added by implementing [`AuditEngine`];
//! the orchestrator and normalizers need no changes.

mod axe;
mod browser;
mod lighthouse;

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use url::Url;

use crate::model::RuleResult;

pub use axe::AxeEngine;
pub use browser::fetch_rendered_dom;
pub use lighthouse::LighthouseEngine;

/// Desktop Chrome user-agent used for audit navigation. Sites serving
/// different markup to bot user agents would otherwise skew results.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to launch audit process: {0}")]
    Launch(#[from] std::io::Error),

    #[error("page blocked: navigation to {0} did not settle in time")]
    PageBlocked(String),

    #[error("audit engine failed: {0}")]
    Engine(String),

    #[error("failed to parse engine output: {0}")]
    Parse(String),
}

/// Trait for audit engines
#[async_trait]
pub trait AuditEngine: Send + Sync {
    /// Short engine name for logging
    fn name(&self) -> &'static str;

    /// Run the engine against a URL and return normalized findings
    async fn audit(&self, url: &Url) -> Result<Vec<RuleResult>, EngineError>;
}

/// Run an engine command to completion with a bounded timeout.
///
/// The child is spawned with `kill_on_drop`, so the underlying browser
/// process is released on every exit path, timeout included.
pub(crate) async fn run_engine_command(
    mut cmd: Command,
    url: &Url,
    timeout: Duration,
) -> Result<std::process::Output, EngineError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| EngineError::PageBlocked(url.to_string()))??;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn command_timeout_maps_to_page_blocked() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let url = Url::parse("https://example.com/").unwrap();

        let result = run_engine_command(cmd, &url, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(EngineError::PageBlocked(_))));
    }

    #[tokio::test]
    async fn missing_program_maps_to_launch_error() {
        let cmd = Command::new("definitely-not-a-real-audit-engine");
        let url = Url::parse("https://example.com/").unwrap();

        let result = run_engine_command(cmd, &url, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(EngineError::Launch(_))));
    }
}
