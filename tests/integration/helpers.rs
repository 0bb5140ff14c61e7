//! Test helpers and utilities

use bytes::Bytes;
use php_input::config::InputConfig;
use php_input::Request;
use tempfile::TempDir;

/// Boundary used by [`MultipartBuilder`].
pub const BOUNDARY: &str = "----php-input-test";

/// Build a request from its parts.
pub fn request(method: &str, uri: &str, content_type: Option<&str>, body: impl Into<Bytes>) -> Request {
    let mut builder = http::Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    Request::from(builder.body(body.into()).expect("Failed to build request"))
}

/// GET request with a query string and no body.
pub fn get(uri: &str) -> Request {
    request("GET", uri, None, Bytes::new())
}

/// Request with a JSON body.
pub fn json(method: &str, uri: &str, body: &str) -> Request {
    request(method, uri, Some("application/json"), body.to_string())
}

/// POST request with a url-encoded form body.
pub fn form(uri: &str, body: &str) -> Request {
    request(
        "POST",
        uri,
        Some("application/x-www-form-urlencoded"),
        body.to_string(),
    )
}

/// Upload directory plus a config writing into it.
pub struct UploadDir {
    pub dir: TempDir,
    pub config: InputConfig,
}

#[allow(dead_code)]
impl UploadDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = InputConfig::default().with_upload_tmp_dir(dir.path());
        Self { dir, config }
    }

    /// Number of files currently stored in the upload directory.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// multipart/form-data body builder
#[derive(Default)]
pub struct MultipartBuilder {
    body: String,
}

#[allow(dead_code)]
impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain form field
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
        self
    }

    /// Add a file part
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, content: &str) -> Self {
        self.body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n{}\r\n",
            BOUNDARY, name, filename, content_type, content
        ));
        self
    }

    /// Finish the body and wrap it in a POST request
    pub fn into_request(mut self, uri: &str) -> Request {
        self.body.push_str(&format!("--{}--\r\n", BOUNDARY));
        request(
            "POST",
            uri,
            Some(&format!("multipart/form-data; boundary={}", BOUNDARY)),
            self.body,
        )
    }
}
