//! Page discovery: same-directory crawl of a seed URL
//!
//! Loads the seed in an isolated headless browser session, collects every
//! anchor's resolved absolute URL, then filters and deduplicates. Discovery
//! is intentionally scoped to the seed's directory (and deeper), never the
//! whole site.

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::engine::{fetch_rendered_dom, EngineError};
use crate::model::{CrawledPage, EngineConfig};

/// Non-HTML extensions excluded from discovery (documents, archives, images).
const DENIED_EXTENSIONS: [&str; 20] = [
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "hwp", "hwpx", "zip", "tar", "gz", "rar",
    "7z", "jpg", "jpeg", "png", "gif", "svg", "webp",
];

const UNTITLED: &str = "(untitled)";

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("invalid crawl url: {0}")]
    InvalidInput(String),

    #[error("page load blocked: {0}")]
    PageLoadBlocked(String),

    #[error("browser error: {0}")]
    Browser(String),
}

pub struct Crawler {
    chrome_bin: String,
    timeout: Duration,
}

impl Crawler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            chrome_bin: config.chrome_bin.clone(),
            timeout: config.crawl_timeout(),
        }
    }

    /// Discover candidate pages under the seed's directory.
    ///
    /// A broken seed makes all further discovery meaningless, so a load
    /// failure is a hard stop with no partial results.
    pub async fn discover(&self, root_url: &str) -> Result<Vec<CrawledPage>, CrawlError> {
        let root = parse_root_url(root_url)?;

        tracing::info!(url = %root, "Starting crawl discovery");

        let html = fetch_rendered_dom(&self.chrome_bin, &root, self.timeout)
            .await
            .map_err(|e| match e {
                EngineError::PageBlocked(url) => CrawlError::PageLoadBlocked(url),
                other => CrawlError::Browser(other.to_string()),
            })?;

        let pages = extract_pages(&html, &root);
        tracing::info!(url = %root, discovered = pages.len(), "Crawl discovery finished");
        Ok(pages)
    }
}

/// Validate the seed: absolute, scheme-prefixed http(s) URL.
fn parse_root_url(raw: &str) -> Result<Url, CrawlError> {
    let url = Url::parse(raw).map_err(|_| CrawlError::InvalidInput(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CrawlError::InvalidInput(raw.to_string()));
    }
    Ok(url)
}

/// The seed URL truncated after its final `/`; discovery keeps only URLs
/// under this prefix.
fn base_directory(root: &Url) -> String {
    let mut stripped = root.clone();
    stripped.set_query(None);
    stripped.set_fragment(None);

    let s = stripped.to_string();
    match s.rfind('/') {
        Some(idx) => s[..=idx].to_string(),
        None => s,
    }
}

/// Extract, filter and deduplicate anchors from the rendered DOM.
///
/// Output keeps first-seen DOM order; two URLs differing only by query
/// string collapse to one entry and the first-seen title wins.
fn extract_pages(html: &str, root: &Url) -> Vec<CrawledPage> {
    let base_dir = base_directory(root);
    let index_url = format!("{}index.html", base_dir);

    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut pages = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = root.join(href) else {
            continue;
        };

        // Fragment links point into a page, not at one
        if resolved.fragment().is_some() {
            continue;
        }

        let mut kept = resolved;
        kept.set_query(None);
        let url = kept.to_string();

        if !url.starts_with(&base_dir) {
            continue;
        }
        // Self-references add nothing to discovery
        if url == base_dir || url == index_url {
            continue;
        }
        if has_denied_extension(kept.path()) {
            continue;
        }
        if !seen.insert(url.clone()) {
            continue;
        }

        let title = element.text().collect::<String>().trim().to_string();
        pages.push(CrawledPage {
            title: if title.is_empty() {
                UNTITLED.to_string()
            } else {
                title
            },
            url,
        });
    }

    pages
}

fn has_denied_extension(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    DENIED_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(&format!(".{}", ext)))
}
