//! Superglobal construction from an HTTP request.
//!
//! Produces the arrays PHP would expose to a script: `$_GET`, `$_POST`,
//! `$_FILES` and the raw body (`php://input`). The input tree is built from
//! these, so any host able to fill a [`Superglobals`] can use
//! [`crate::input::InputHandler`].

mod files;
#[cfg(feature = "multipart")]
mod multipart;
mod parser;
mod temp;

use bytes::Bytes;

use crate::config::InputConfig;
use crate::core::{ContentKind, Request};
use crate::types::RawArray;

pub use files::{build_files_array, FILE_COLUMNS};
pub use temp::TempUploads;
#[cfg(feature = "multipart")]
pub use multipart::{parse_multipart, UploadList};
pub use parser::{
    build_array, fast_percent_decode, insert_path, parse_key, parse_key_within,
    parse_query_string, parse_urlencoded, parse_urlencoded_with, DecodeLimits, NestingExceeded,
};

/// Platform input arrays for one request.
#[derive(Debug, Clone, Default)]
pub struct Superglobals {
    /// `$_GET`
    pub get: RawArray,
    /// `$_POST`
    pub post: RawArray,
    /// `$_FILES`
    pub files: RawArray,
    /// `php://input`
    pub body: Bytes,
    /// Temp files of this request's uploads, deleted when dropped.
    pub uploads: TempUploads,
}

impl Superglobals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get(mut self, get: RawArray) -> Self {
        self.get = get;
        self
    }

    pub fn with_post(mut self, post: RawArray) -> Self {
        self.post = post;
        self
    }

    pub fn with_files(mut self, files: RawArray) -> Self {
        self.files = files;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the superglobals that need no async work: query string,
    /// url-encoded form body and raw body.
    ///
    /// Multipart bodies are left undecoded; see [`Superglobals::from_request`].
    pub fn decode(request: &Request, config: &InputConfig) -> Self {
        let limits = config.decode_limits();
        let mut globals = Self {
            get: request
                .query()
                .map(|query| parse_urlencoded_with(query, &limits))
                .unwrap_or_default(),
            body: request.body().clone(),
            ..Self::default()
        };

        if !accepts_body(request, config) {
            return globals;
        }

        if request.content_kind() == ContentKind::FormUrlEncoded {
            let body = String::from_utf8_lossy(request.body());
            globals.post = parse_urlencoded_with(&body, &limits);
        }

        tracing::debug!(
            get = globals.get.len(),
            post = globals.post.len(),
            body_len = globals.body.len(),
            "superglobals: decoded"
        );

        globals
    }

    /// Build all superglobals, including multipart fields and uploads.
    ///
    /// Uploaded files are written to `config.upload_tmp_dir` and belong to
    /// the returned value: they are deleted once it (and every clone) is
    /// dropped, unless moved away first. Files stored before a parse error
    /// are deleted before the error is returned.
    #[cfg(feature = "multipart")]
    pub async fn from_request(request: &Request, config: &InputConfig) -> crate::core::Result<Self> {
        let mut globals = Self::decode(request, config);

        if request.content_kind() != ContentKind::Multipart || !accepts_body(request, config) {
            return Ok(globals);
        }

        let boundary = request.multipart_boundary().ok_or_else(|| {
            crate::core::Error::InvalidRequest("missing boundary in multipart content-type".into())
        })?;

        let (params, uploads) = parse_multipart(&boundary, request.body().clone(), config).await?;
        let limits = config.decode_limits();
        globals.uploads = TempUploads::from_uploads(&uploads);
        globals.post = build_array(params, &limits);
        globals.files = build_files_array(uploads, &limits);

        tracing::debug!(
            post = globals.post.len(),
            files = globals.files.len(),
            "superglobals: decoded multipart"
        );

        Ok(globals)
    }
}

/// Body-bearing method within `post_max_size`.
fn accepts_body(request: &Request, config: &InputConfig) -> bool {
    if !request.has_body_method() {
        return false;
    }

    let len = request.body().len() as u64;
    if len > config.post_max_size {
        tracing::debug!(
            body_len = len,
            post_max_size = config.post_max_size,
            "superglobals: body exceeds post_max_size, skipping form decoding"
        );
        return false;
    }

    true
}
