//! HTTP request abstraction consumed by the input layer.

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, Method, Uri};

/// Header name constants for fast lookup.
mod header_names {
    use super::*;

    pub static CONTENT_TYPE: HeaderName = header::CONTENT_TYPE;
    pub static CONTENT_LENGTH: HeaderName = header::CONTENT_LENGTH;
}

/// Methods whose body is decoded into `$_POST`-style data.
pub const BODY_METHODS: [Method; 4] = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

/// Content type classification used to pick a body decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `application/json` (and `+json` suffixes)
    Json,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
    /// `multipart/form-data`
    Multipart,
    /// Anything else, or no content type at all
    Other,
}

impl ContentKind {
    /// Classify a raw `Content-Type` header value.
    pub fn from_header(value: &str) -> Self {
        let essence = value
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/json" => ContentKind::Json,
            "application/x-www-form-urlencoded" => ContentKind::FormUrlEncoded,
            "multipart/form-data" => ContentKind::Multipart,
            other if other.starts_with("application/") && other.ends_with("+json") => {
                ContentKind::Json
            }
            _ => ContentKind::Other,
        }
    }
}

/// HTTP request as seen by the input layer.
///
/// Note: Clone is intentionally not derived to prevent expensive copies.
/// Use references or move semantics instead.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Create a new request.
    #[inline]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// Get the HTTP method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the request path.
    #[inline]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Get the query string.
    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the raw request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get a header value by string name (case-insensitive).
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get Content-Type header.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(&header_names::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Get Content-Length header.
    #[inline]
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(&header_names::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    /// Classified Content-Type.
    #[inline]
    pub fn content_kind(&self) -> ContentKind {
        self.content_type()
            .map(ContentKind::from_header)
            .unwrap_or(ContentKind::Other)
    }

    /// Whether the method conventionally carries a decodable body.
    #[inline]
    pub fn has_body_method(&self) -> bool {
        BODY_METHODS.contains(&self.method)
    }

    /// Boundary parameter of a multipart Content-Type.
    pub fn multipart_boundary(&self) -> Option<String> {
        self.content_type()?.split(';').find_map(|part| {
            let trimmed = part.trim();
            // Case-insensitive boundary search
            if trimmed.len() > 9 && trimmed[..9].eq_ignore_ascii_case("boundary=") {
                Some(trimmed[9..].trim_matches('"').to_string())
            } else {
                None
            }
        })
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: Into<Bytes>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_http() {
        let http_req = http::Request::builder()
            .method("GET")
            .uri("/test?foo=bar")
            .body(Bytes::new())
            .unwrap();

        let req = Request::from(http_req);

        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/test");
        assert_eq!(req.query(), Some("foo=bar"));
        assert!(!req.has_body_method());
        assert_eq!(req.content_kind(), ContentKind::Other);
    }

    #[test]
    fn test_request_headers() {
        let http_req = http::Request::builder()
            .method("POST")
            .uri("/api")
            .header("content-type", "application/json; charset=utf-8")
            .header("content-length", "42")
            .body(Bytes::new())
            .unwrap();

        let req = Request::from(http_req);

        assert_eq!(req.content_type(), Some("application/json; charset=utf-8"));
        assert_eq!(req.content_length(), Some(42));
        assert_eq!(req.content_kind(), ContentKind::Json);
        assert!(req.has_body_method());
    }

    #[test]
    fn test_content_kind_classification() {
        assert_eq!(
            ContentKind::from_header("Application/JSON"),
            ContentKind::Json
        );
        assert_eq!(
            ContentKind::from_header("application/vnd.api+json"),
            ContentKind::Json
        );
        assert_eq!(
            ContentKind::from_header("application/x-www-form-urlencoded"),
            ContentKind::FormUrlEncoded
        );
        assert_eq!(
            ContentKind::from_header("multipart/form-data; boundary=abc"),
            ContentKind::Multipart
        );
        assert_eq!(ContentKind::from_header("text/plain"), ContentKind::Other);
    }

    #[test]
    fn test_multipart_boundary() {
        let http_req = http::Request::builder()
            .method("POST")
            .uri("/upload")
            .header("content-type", "multipart/form-data; BOUNDARY=\"xyz\"")
            .body(Bytes::new())
            .unwrap();

        assert_eq!(
            Request::from(http_req).multipart_boundary(),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn test_header_by_string() {
        let http_req = http::Request::builder()
            .method("GET")
            .uri("/")
            .header("x-custom-header", "custom-value")
            .body(Bytes::new())
            .unwrap();

        let req = Request::from(http_req);
        assert_eq!(req.header("X-Custom-Header"), Some("custom-value"));
    }
}
