// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub routes: RoutesConfig,
    pub assets: AssetsConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for in-flight connections on shutdown
    pub shutdown_timeout: u64,
}

/// Designated paths answered by the dispatcher itself
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RoutesConfig {
    /// Liveness probe path (exact match)
    pub health_path: String,
    /// Build identifier path (exact match)
    pub version_path: String,
    /// Prefix reserved for synthetic responses; unknown routes under it get a JSON 404
    pub api_prefix: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            health_path: "/api/healthz".to_string(),
            version_path: "/api/version".to_string(),
            api_prefix: "/api/".to_string(),
        }
    }
}

/// Which static-asset backend serves non-API requests
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssetBackendKind {
    /// Serve prebuilt files from a local directory
    Dir,
    /// Forward to an upstream HTTP origin
    Origin,
}

/// Static-asset backend configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetsConfig {
    pub backend: AssetBackendKind,
    /// Site output directory (dir backend)
    pub root: String,
    pub index_files: Vec<String>,
    /// Page served with status 404, relative to `root`
    #[serde(default)]
    pub not_found_page: Option<String>,
    /// Resolve `/page` to `page.html` when no exact file exists
    pub clean_urls: bool,
    /// Upstream base URL, e.g. `http://127.0.0.1:4173` (origin backend)
    #[serde(default)]
    pub origin: Option<String>,
    pub timeout_ms: u64,
}

/// Deployment-time build information
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Source revision exposed by the version endpoint
    #[serde(default)]
    pub git_sha: Option<String>,
}
