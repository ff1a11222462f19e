//! Headless-browser page loading for crawl discovery

use std::time::Duration;
use tokio::process::Command;
use url::Url;

use super::{run_engine_command, EngineError, DESKTOP_USER_AGENT};

/// Virtual-time budget granted to the page before the DOM is dumped.
/// Approximates network quiescence: pages with long-polling or analytics
/// connections would otherwise never fire "fully loaded".
const VIRTUAL_TIME_BUDGET_MS: u32 = 10_000;

/// Load `url` in an isolated headless Chrome session and return the rendered
/// DOM as HTML.
///
/// One browser process per call: launched, used once, and terminated on every
/// exit path. Timeout maps to [`EngineError::PageBlocked`].
pub async fn fetch_rendered_dom(
    chrome_bin: &str,
    url: &Url,
    timeout: Duration,
) -> Result<String, EngineError> {
    tracing::debug!(url = %url, chrome_bin = %chrome_bin, "Loading page in headless browser");

    let mut cmd = Command::new(chrome_bin);
    cmd.arg("--headless=new")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--user-agent={}", DESKTOP_USER_AGENT))
        .arg(format!("--virtual-time-budget={}", VIRTUAL_TIME_BUDGET_MS))
        .arg("--dump-dom")
        .arg(url.as_str());

    let output = run_engine_command(cmd, url, timeout).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EngineError::Engine(format!(
            "browser exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout).map_err(|e| EngineError::Parse(e.to_string()))
}
