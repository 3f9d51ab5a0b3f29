//! Static-asset backends
//!
//! The dispatcher delegates every non-API request to an [`AssetBackend`].
//! Two integrations exist: a local directory holding the generated site and
//! an upstream HTTP origin.

mod origin;
mod static_dir;

pub use origin::OriginProxy;
pub use static_dir::StaticDir;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use std::time::Duration;

use crate::config::{AssetBackendKind, AssetsConfig};
use crate::error::{AssetError, BoxError};

/// Capability to forward a request to the static-asset origin
///
/// The returned response is handed back to the client verbatim.
// Futures are driven on a LocalSet, so they need not be Send
#[allow(async_fn_in_trait)]
pub trait AssetBackend {
    async fn fetch<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, AssetError>
    where
        B: Body,
        B::Error: Into<BoxError>;
}

/// Backend selected by `assets.backend`
#[derive(Debug)]
pub enum Assets {
    Dir(StaticDir),
    Origin(OriginProxy),
}

impl Assets {
    pub fn from_config(cfg: &AssetsConfig) -> Result<Self, AssetError> {
        match cfg.backend {
            AssetBackendKind::Dir => Ok(Self::Dir(StaticDir::from_config(cfg))),
            AssetBackendKind::Origin => {
                let origin = cfg.origin.as_deref().ok_or_else(|| {
                    AssetError::InvalidUri("assets.origin is not set".to_string())
                })?;
                let proxy = OriginProxy::new(origin, Duration::from_millis(cfg.timeout_ms))?;
                Ok(Self::Origin(proxy))
            }
        }
    }

    /// Short description for the startup banner
    pub fn describe(&self) -> String {
        match self {
            Self::Dir(dir) => format!("directory {}", dir.root().display()),
            Self::Origin(proxy) => format!("origin {}", proxy.base_url()),
        }
    }
}

impl AssetBackend for Assets {
    async fn fetch<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, AssetError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        match self {
            Self::Dir(dir) => dir.fetch(req).await,
            Self::Origin(proxy) => proxy.fetch(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets_config(backend: AssetBackendKind, origin: Option<&str>) -> AssetsConfig {
        AssetsConfig {
            backend,
            root: "site".to_string(),
            index_files: vec!["index.html".to_string()],
            not_found_page: None,
            clean_urls: true,
            origin: origin.map(String::from),
            timeout_ms: 1000,
        }
    }

    #[tokio::test]
    async fn test_from_config_dir() {
        let assets = Assets::from_config(&assets_config(AssetBackendKind::Dir, None)).unwrap();
        assert!(matches!(assets, Assets::Dir(_)));
        assert_eq!(assets.describe(), "directory site");
    }

    #[tokio::test]
    async fn test_from_config_origin() {
        let cfg = assets_config(AssetBackendKind::Origin, Some("http://127.0.0.1:4173"));
        let assets = Assets::from_config(&cfg).unwrap();
        assert!(matches!(assets, Assets::Origin(_)));
        assert_eq!(assets.describe(), "origin http://127.0.0.1:4173");
    }

    #[test]
    fn test_from_config_origin_missing() {
        let cfg = assets_config(AssetBackendKind::Origin, None);
        assert!(matches!(
            Assets::from_config(&cfg),
            Err(AssetError::InvalidUri(_))
        ));
    }
}
