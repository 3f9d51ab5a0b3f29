//! HTTP origin backend
//!
//! Forwards the request to an upstream server (e.g. the site generator's
//! preview server) and returns its response unchanged. Bodies are buffered
//! in both directions; the whole exchange is bounded by one timeout.

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONNECTION};
use hyper::http::uri::{Authority, PathAndQuery, Scheme};
use hyper::{HeaderMap, Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

use super::AssetBackend;
use crate::error::{AssetError, BoxError};

#[derive(Debug)]
pub struct OriginProxy {
    scheme: Scheme,
    authority: Authority,
    timeout: Duration,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl OriginProxy {
    /// Create a proxy for `origin`, an `http://host[:port]` base URL
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, AssetError> {
        let uri: Uri = origin
            .parse()
            .map_err(|e| AssetError::InvalidUri(format!("{origin}: {e}")))?;

        if uri.scheme() != Some(&Scheme::HTTP) {
            return Err(AssetError::InvalidUri(format!(
                "{origin}: only http:// origins are supported"
            )));
        }
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| AssetError::InvalidUri(format!("{origin}: missing host")))?;

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(30))
            .build_http();

        Ok(Self {
            scheme: Scheme::HTTP,
            authority,
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }

    /// Point the original path and query at the origin
    fn upstream_uri(&self, original: &Uri) -> Result<Uri, AssetError> {
        let path_and_query = original
            .path_and_query()
            .map_or("/", PathAndQuery::as_str);

        Ok(Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?)
    }

    async fn exchange(
        &self,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Full<Bytes>>, AssetError> {
        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| AssetError::Upstream(e.to_string()))?;

        let (parts, body) = resp.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| AssetError::Upstream(e.to_string()))?
            .to_bytes();

        Ok(Response::from_parts(parts, Full::new(body)))
    }
}

impl AssetBackend for OriginProxy {
    async fn fetch<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, AssetError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (mut parts, body) = req.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| AssetError::RequestBody(e.into()))?
            .to_bytes();
        parts.uri = self.upstream_uri(&parts.uri)?;
        strip_hop_by_hop(&mut parts.headers);

        let upstream = Request::from_parts(parts, Full::new(body));
        tokio::time::timeout(self.timeout, self.exchange(upstream))
            .await
            .map_err(|_| AssetError::Timeout(self.timeout))?
    }
}

/// Headers that describe a single connection (RFC 9110 section 7.6.1)
///
/// `upgrade` is included since the buffered exchange cannot switch protocols.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove headers that must not cross to the upstream connection,
/// including any named in `Connection`
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in &listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Incoming;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    /// Upstream that echoes what it received in headers and body
    async fn spawn_echo_origin() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let service = service_fn(|req: Request<Incoming>| async move {
                        let target = req.uri().to_string();
                        let host = req
                            .headers()
                            .get("host")
                            .cloned()
                            .unwrap_or_else(|| hyper::header::HeaderValue::from_static("-"));
                        let names = req
                            .headers()
                            .keys()
                            .map(HeaderName::as_str)
                            .collect::<Vec<_>>()
                            .join(",");
                        let method = req.method().to_string();
                        let body = req.into_body().collect().await.unwrap().to_bytes();

                        let resp = Response::builder()
                            .status(299)
                            .header("X-Upstream-Target", target)
                            .header("X-Upstream-Host", host)
                            .header("X-Upstream-Headers", names)
                            .header("Content-Type", "text/plain")
                            .body(Full::new(Bytes::from(format!(
                                "{method} {}",
                                String::from_utf8_lossy(&body)
                            ))))
                            .unwrap();
                        Ok::<_, Infallible>(resp)
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });
        addr
    }

    /// Upstream that accepts connections and never answers
    async fn spawn_silent_origin() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        addr
    }

    #[test]
    fn test_new_validates_origin() {
        let timeout = Duration::from_secs(1);
        assert!(OriginProxy::new("http://127.0.0.1:4173", timeout).is_ok());
        assert!(matches!(
            OriginProxy::new("https://docs.example.com", timeout),
            Err(AssetError::InvalidUri(_))
        ));
        assert!(matches!(
            OriginProxy::new("/just/a/path", timeout),
            Err(AssetError::InvalidUri(_))
        ));
        assert!(matches!(
            OriginProxy::new("not a url", timeout),
            Err(AssetError::InvalidUri(_))
        ));
    }

    #[test]
    fn test_upstream_uri_keeps_path_and_query() {
        let proxy = OriginProxy::new("http://origin.internal:8080", Duration::from_secs(1)).unwrap();
        let uri: Uri = "https://docs.example.com/docs/getting-started?tab=mac"
            .parse()
            .unwrap();
        assert_eq!(
            proxy.upstream_uri(&uri).unwrap(),
            "http://origin.internal:8080/docs/getting-started?tab=mac"
        );

        let uri: Uri = "/".parse().unwrap();
        assert_eq!(
            proxy.upstream_uri(&uri).unwrap(),
            "http://origin.internal:8080/"
        );
    }

    #[tokio::test]
    async fn test_forwards_request_and_response() {
        let addr = spawn_echo_origin().await;
        let proxy = OriginProxy::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();

        let req = Request::builder()
            .method("POST")
            .uri("/docs/search?q=sandbox")
            .header("Host", "docs.example.com")
            .body(Full::new(Bytes::from("payload")))
            .unwrap();
        let resp = proxy.fetch(req).await.unwrap();

        assert_eq!(resp.status(), 299);
        assert_eq!(resp.headers()["x-upstream-target"], "/docs/search?q=sandbox");
        assert_eq!(resp.headers()["x-upstream-host"], "docs.example.com");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "POST payload");
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", "keep-alive, X-Trace".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert("te", "trailers".parse().unwrap());
        headers.insert("transfer-encoding", "chunked".parse().unwrap());
        headers.insert("upgrade", "websocket".parse().unwrap());
        headers.insert("x-trace", "1".parse().unwrap());
        headers.insert("accept", "text/html".parse().unwrap());
        headers.insert("host", "docs.example.com".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        let mut names: Vec<&str> = headers.keys().map(HeaderName::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["accept", "host"]);
    }

    #[tokio::test]
    async fn test_hop_by_hop_headers_not_forwarded() {
        let addr = spawn_echo_origin().await;
        let proxy = OriginProxy::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();

        let req = Request::builder()
            .uri("/docs/")
            .header("Host", "docs.example.com")
            .header("Connection", "keep-alive, X-Trace")
            .header("Keep-Alive", "timeout=5")
            .header("TE", "trailers")
            .header("X-Trace", "1")
            .header("Accept", "text/html")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = proxy.fetch(req).await.unwrap();

        let received = resp.headers()["x-upstream-headers"].to_str().unwrap();
        let received: Vec<&str> = received.split(',').collect();
        assert!(received.contains(&"accept"));
        for name in ["connection", "keep-alive", "te", "x-trace"] {
            assert!(!received.contains(&name), "{name} was forwarded");
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let addr = spawn_silent_origin().await;
        let proxy = OriginProxy::new(&format!("http://{addr}"), Duration::from_millis(50)).unwrap();

        let req = Request::builder()
            .uri("/slow")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let err = proxy.fetch(req).await.unwrap_err();
        assert!(matches!(err, AssetError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unreachable_origin() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let proxy = OriginProxy::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let req = Request::builder()
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let err = proxy.fetch(req).await.unwrap_err();
        assert!(matches!(err, AssetError::Upstream(_)));
    }
}
