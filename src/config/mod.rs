// Configuration module entry point
// Loads layered configuration once per process and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{AssetBackendKind, AssetsConfig, Config, RoutesConfig};

/// Environment variable carrying the build identifier
pub const GIT_SHA_VAR: &str = "GIT_SHA";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; defaults and `EDGE_*` variables still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_git_sha(config_path, std::env::var(GIT_SHA_VAR).ok())
    }

    /// Load configuration, letting `git_sha` (when present) override `build.git_sha`
    pub fn load_with_git_sha(
        config_path: &str,
        git_sha: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        Self::load_layered(config_path, git_sha, None)
    }

    /// Build the layered configuration
    ///
    /// `env_vars` replaces the process environment when given. Values stay
    /// strings until deserialization so `build.git_sha` is never coerced.
    fn load_layered(
        config_path: &str,
        git_sha: Option<String>,
        env_vars: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("EDGE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env_vars),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8787)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("routes.health_path", "/api/healthz")?
            .set_default("routes.version_path", "/api/version")?
            .set_default("routes.api_prefix", "/api/")?
            .set_default("assets.backend", "dir")?
            .set_default("assets.root", "docs/.vitepress/dist")?
            .set_default("assets.index_files", vec!["index.html"])?
            .set_default("assets.not_found_page", "404.html")?
            .set_default("assets.clean_urls", true)?
            .set_default("assets.timeout_ms", 10_000)?
            .set_override_option("build.git_sha", git_sha)?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        // An empty page name disables the custom 404 page
        if cfg.assets.not_found_page.as_deref() == Some("") {
            cfg.assets.not_found_page = None;
        }
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Reject configurations the dispatcher cannot honour
    pub fn validate(&self) -> Result<(), String> {
        let routes = &self.routes;
        for (name, path) in [
            ("routes.health_path", &routes.health_path),
            ("routes.version_path", &routes.version_path),
            ("routes.api_prefix", &routes.api_prefix),
        ] {
            if !path.starts_with('/') {
                return Err(format!("{name} must start with '/': {path:?}"));
            }
        }
        if routes.api_prefix == "/" {
            return Err("routes.api_prefix must not be the site root".to_string());
        }

        if self.assets.backend == AssetBackendKind::Origin && self.assets.origin.is_none() {
            return Err("assets.origin is required when assets.backend = \"origin\"".to_string());
        }
        Ok(())
    }
}
