//! Edge dispatcher
//!
//! Classifies a request by URL path and either answers it directly
//! (health, version, unknown API route) or hands it to the asset backend.
//! The dispatcher is a pure function of the request and the environment;
//! its only side effect is the delegated backend fetch.

mod rules;

pub use rules::{Action, RuleSet};

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, Uri};

use crate::assets::AssetBackend;
use crate::error::{BoxError, DispatchError};
use crate::http;

/// Deployment environment, immutable for the lifetime of the process
#[derive(Debug)]
pub struct Env<A> {
    /// Build identifier exposed by the version endpoint
    pub git_sha: Option<String>,
    /// Designated paths, in evaluation order
    pub rules: RuleSet,
    /// Static-asset backend handle
    pub assets: A,
}

/// Resolve one request into exactly one response
///
/// Synthetic responses never fail. A backend failure is returned as
/// `DispatchError::Asset` without retry or substitute content.
pub async fn dispatch<A, B>(
    req: Request<B>,
    env: &Env<A>,
) -> Result<Response<Full<Bytes>>, DispatchError>
where
    A: AssetBackend,
    B: Body,
    B::Error: Into<BoxError>,
{
    let action = env.rules.resolve(request_path(req.uri())?);

    match action {
        Some(Action::Health) => Ok(http::build_health_response()),
        Some(Action::Version) => Ok(http::build_version_response(env.git_sha.as_deref())),
        Some(Action::ApiNotFound) => Ok(http::build_api_not_found_response()),
        None => Ok(env.assets.fetch(req).await?),
    }
}

/// Extract the absolute path of the request target
///
/// Authority-form (`host:port`) and asterisk-form (`*`) targets carry no
/// path to classify.
fn request_path(uri: &Uri) -> Result<&str, DispatchError> {
    let path = uri.path();
    if path.starts_with('/') {
        Ok(path)
    } else {
        Err(DispatchError::MalformedUrl(uri.to_string()))
    }
}
