use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

const ENV_CONFIG_PATH: &str = "A11Y_WORKER_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const ENV_CHROME_BIN: &str = "A11Y_WORKER_CHROME_BIN";

const DEFAULT_CHROME_BIN: &str = "chromium";
const DEFAULT_AXE_PROGRAM: &str = "axe";
const DEFAULT_LIGHTHOUSE_PROGRAM: &str = "lighthouse";
const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CRAWL_TIMEOUT_SECS: u64 = 60;

/// External command used to invoke an audit engine.
///
/// The target URL and the engine's fixed flags are appended at invocation
/// time, so `args` only carries site-specific extras (proxy flags, etc.).
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }
}

/// Browser and audit-engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chrome/Chromium binary used for crawl page loads.
    pub chrome_bin: String,
    /// Command for the axe CLI.
    pub axe: CommandConfig,
    /// Command for the Lighthouse CLI.
    pub lighthouse: CommandConfig,
    /// Per-navigation bound for audit engine runs, in seconds.
    pub navigation_timeout_secs: u64,
    /// Bound for the crawl seed page load, in seconds.
    pub crawl_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chrome_bin: DEFAULT_CHROME_BIN.to_string(),
            axe: CommandConfig::with_program(DEFAULT_AXE_PROGRAM),
            lighthouse: CommandConfig::with_program(DEFAULT_LIGHTHOUSE_PROGRAM),
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            crawl_timeout_secs: DEFAULT_CRAWL_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn crawl_timeout(&self) -> Duration {
        Duration::from_secs(self.crawl_timeout_secs)
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub engines: EngineConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub engines: EngineConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engines: EngineConfig::default(),
            port: 4000,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4000);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut engines = Self::load_config_file(&config_path)
            .map(|cf| cf.engines)
            .unwrap_or_default();

        if let Ok(chrome_bin) = std::env::var(ENV_CHROME_BIN) {
            engines.chrome_bin = chrome_bin;
        }

        Self {
            engines,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Handle empty file
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
