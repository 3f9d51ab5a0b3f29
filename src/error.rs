//! Error types for the edge dispatcher and its asset backends

use std::time::Duration;
use thiserror::Error;

/// Boxed error used for foreign body errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a static-asset backend
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read request body: {0}")]
    RequestBody(BoxError),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Upstream timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Invalid upstream URI: {0}")]
    InvalidUri(String),

    #[error("Failed to build response: {0}")]
    Http(#[from] hyper::http::Error),
}

/// Failure of a single dispatch
///
/// Unknown API routes are not errors; they resolve to a JSON 404.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Malformed request URL: {0}")]
    MalformedUrl(String),

    #[error("Asset backend failed: {0}")]
    Asset(#[from] AssetError),
}
