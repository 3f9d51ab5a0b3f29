//! Static directory backend
//!
//! Serves the generated documentation site from a local directory with
//! index files, clean URLs, a custom 404 page, `ETag` and Range support.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{IF_NONE_MATCH, RANGE};
use hyper::{HeaderMap, Method, Request, Response};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::AssetBackend;
use crate::config::AssetsConfig;
use crate::error::{AssetError, BoxError};
use crate::http::{self, cache, mime, range::RangeOutcome};
use crate::logger;

#[derive(Debug, Clone)]
pub struct StaticDir {
    root: PathBuf,
    index_files: Vec<String>,
    not_found_page: Option<String>,
    clean_urls: bool,
}

impl StaticDir {
    pub fn from_config(cfg: &AssetsConfig) -> Self {
        Self {
            root: PathBuf::from(&cfg.root),
            index_files: cfg.index_files.clone(),
            not_found_page: cfg.not_found_page.clone(),
            clean_urls: cfg.clean_urls,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Answer a request for `path` from the site directory
    async fn serve(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Response<Full<Bytes>>, AssetError> {
        match *method {
            Method::GET | Method::HEAD => {}
            Method::OPTIONS => return Ok(http::build_options_response()),
            _ => return Ok(http::build_405_response()),
        }
        let is_head = *method == Method::HEAD;

        let Some(file) = self.resolve(path).await? else {
            return self.not_found(is_head).await;
        };

        let data = Bytes::from(fs::read(&file).await?);
        Ok(build_file_response(
            data,
            mime::content_type_for(&file),
            header_str(headers, &IF_NONE_MATCH),
            header_str(headers, &RANGE),
            is_head,
        ))
    }

    /// Map a URL path to an existing file inside the root
    async fn resolve(&self, path: &str) -> Result<Option<PathBuf>, AssetError> {
        let relative = path.trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
            return Ok(None);
        }

        let root = match fs::canonicalize(&self.root).await {
            Ok(p) => p,
            Err(e) => {
                logger::log_warning(&format!(
                    "Static directory not found or inaccessible '{}': {e}",
                    self.root.display()
                ));
                return Err(AssetError::Io(e));
            }
        };

        for candidate in self.candidates(&root, relative).await {
            // Missing candidates are the common case, not worth logging
            let Ok(canonical) = fs::canonicalize(&candidate).await else {
                continue;
            };
            if !canonical.starts_with(&root) {
                logger::log_warning(&format!(
                    "Path escapes static directory: {path} -> {}",
                    canonical.display()
                ));
                return Ok(None);
            }
            if fs::metadata(&canonical).await.is_ok_and(|m| m.is_file()) {
                return Ok(Some(canonical));
            }
        }
        Ok(None)
    }

    /// Files that may answer `relative`, in order of preference
    async fn candidates(&self, root: &Path, relative: &str) -> Vec<PathBuf> {
        let base = root.join(relative);

        let is_dir = fs::metadata(&base).await.is_ok_and(|m| m.is_dir());
        if relative.is_empty() || relative.ends_with('/') || is_dir {
            return self.index_files.iter().map(|index| base.join(index)).collect();
        }

        let mut candidates = vec![base.clone()];
        if self.clean_urls && !relative.ends_with(".html") {
            let mut html = base.into_os_string();
            html.push(".html");
            candidates.push(PathBuf::from(html));
        }
        candidates
    }

    /// The site's 404 page when present, otherwise a plain 404
    async fn not_found(&self, is_head: bool) -> Result<Response<Full<Bytes>>, AssetError> {
        if let Some(page) = &self.not_found_page {
            match fs::read(self.root.join(page)).await {
                Ok(content) => {
                    return Ok(http::response::build_not_found_page_response(
                        Bytes::from(content),
                        is_head,
                    ))
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(AssetError::Io(e)),
            }
        }
        Ok(http::build_404_response())
    }
}

impl AssetBackend for StaticDir {
    async fn fetch<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, AssetError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        self.serve(req.method(), req.uri().path(), req.headers())
            .await
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &hyper::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Build file response with `ETag` and Range support
fn build_file_response(
    data: Bytes,
    content_type: &str,
    if_none_match: Option<&str>,
    range_header: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);
    let total_size = data.len();

    if cache::etag_matches(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    match http::parse_range_header(range_header, total_size) {
        RangeOutcome::Partial { start, end } => http::response::build_partial_response(
            data.slice(start..=end),
            content_type,
            &etag,
            start,
            end,
            total_size,
            is_head,
        ),
        RangeOutcome::Unsatisfiable => http::build_416_response(total_size),
        RangeOutcome::Full => {
            http::response::build_cached_response(data, content_type, &etag, is_head)
        }
    }
}
