//! HTTP response building module
//!
//! Provides builders for the dispatcher's synthetic responses, the asset
//! backend's file responses and the edge runtime's error responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

const TEXT_UTF8: &str = "text/plain; charset=utf-8";
const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Build health check response: `200 ok\n`
pub fn build_health_response() -> Response<Full<Bytes>> {
    build_text_response(200, TEXT_UTF8, "ok\n")
}

/// Build version response: `{"sha":"<id>"}` or `{"sha":null}`
pub fn build_version_response(git_sha: Option<&str>) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "sha": git_sha }).to_string();
    build_text_response(200, JSON_UTF8, body)
}

/// Build JSON 404 for unknown API routes
pub fn build_api_not_found_response() -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": "not_found" }).to_string();
    build_text_response(404, JSON_UTF8, body)
}

/// Build a response carrying only `Content-Type` and a body
fn build_text_response(
    status: u16,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let body = body.into();
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(Full::new(body))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(304)
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(404, "text/plain", "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> Response<Full<Bytes>> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from("Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::from("Range Not Satisfiable")))
        })
}

/// Build the site's own not-found page with status 404
pub fn build_not_found_page_response(content: Bytes, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head { Bytes::new() } else { content };

    Response::builder()
        .status(404)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("404 page", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build success response with cache control
pub fn build_cached_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    start: usize,
    end: usize,
    total_size: usize,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = end - start + 1;
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(206)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Content-Range", format!("bytes {start}-{end}/{total_size}"))
        .header("Accept-Ranges", "bytes")
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 400 Bad Request response for unparseable request targets
pub fn build_400_response() -> Response<Full<Bytes>> {
    build_text_response(400, "text/plain", "400 Bad Request")
}

/// Build 502 Bad Gateway response for failed asset fetches
pub fn build_502_response() -> Response<Full<Bytes>> {
    build_text_response(502, "text/plain", "502 Bad Gateway")
}

/// Build 504 Gateway Timeout response for timed out asset fetches
pub fn build_504_response() -> Response<Full<Bytes>> {
    build_text_response(504, "text/plain", "504 Gateway Timeout")
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_health_response() {
        let resp = build_health_response();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers().len(), 1);
        assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
        assert_eq!(body_bytes(resp).await, "ok\n");
    }

    #[tokio::test]
    async fn test_version_response() {
        let resp = build_version_response(Some("abc123"));
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["content-type"],
            "application/json; charset=utf-8"
        );
        assert_eq!(body_bytes(resp).await, r#"{"sha":"abc123"}"#);

        let resp = build_version_response(None);
        assert_eq!(body_bytes(resp).await, r#"{"sha":null}"#);

        let resp = build_version_response(Some(""));
        assert_eq!(body_bytes(resp).await, r#"{"sha":""}"#);
    }

    #[tokio::test]
    async fn test_api_not_found_response() {
        let resp = build_api_not_found_response();
        assert_eq!(resp.status(), 404);
        assert_eq!(
            resp.headers()["content-type"],
            "application/json; charset=utf-8"
        );
        assert_eq!(body_bytes(resp).await, r#"{"error":"not_found"}"#);
    }

    #[tokio::test]
    async fn test_head_keeps_length() {
        let resp = build_cached_response(Bytes::from("hello"), "text/plain", "\"e\"", true);
        assert_eq!(resp.headers()["content-length"], "5");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[test]
    fn test_gateway_errors() {
        assert_eq!(build_400_response().status(), 400);
        assert_eq!(build_502_response().status(), 502);
        assert_eq!(build_504_response().status(), 504);
    }
}
