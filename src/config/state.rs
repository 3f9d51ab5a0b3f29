// Application state module
// Holds the immutable deployment environment shared by all connections

use super::types::Config;
use crate::assets::Assets;
use crate::dispatch::{Env, RuleSet};
use crate::error::AssetError;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Read-only environment handed to every dispatch
    pub env: Env<Assets>,
}

impl AppState {
    /// Build the environment once per process from the loaded configuration
    pub fn new(config: &Config) -> Result<Self, AssetError> {
        let env = Env {
            git_sha: config.build.git_sha.clone(),
            rules: RuleSet::from_config(&config.routes),
            assets: Assets::from_config(&config.assets)?,
        };

        Ok(Self {
            config: config.clone(),
            env,
        })
    }
}
