//! Multipart form data parsing.

use std::path::Path;

use bytes::Bytes;
use futures_util::stream;
use multer::Multipart;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::InputConfig;
use crate::core::Result;
use crate::types::{ParamList, UploadError, UploadedFile};

/// Uploaded files keyed by their raw field name (`photos[group][]`).
pub type UploadList = Vec<(String, UploadedFile)>;

/// Parse multipart form data.
///
/// Returns a tuple of (form fields, uploaded files). Field names are kept
/// verbatim so bracket paths can be applied when the superglobals are built.
pub async fn parse_multipart(
    boundary: &str,
    body: Bytes,
    config: &InputConfig,
) -> Result<(ParamList, UploadList)> {
    tracing::debug!(
        boundary = %boundary,
        body_len = body.len(),
        "parse_multipart: starting"
    );

    let mut multipart = Multipart::new(
        stream::once(async { Ok::<_, std::io::Error>(body) }),
        boundary,
    );

    let mut params = Vec::new();
    let mut files: UploadList = Vec::new();

    if let Err(e) = read_parts(&mut multipart, config, &mut params, &mut files).await {
        discard_uploads(&files).await;
        return Err(e);
    }

    tracing::debug!(
        params_count = params.len(),
        files_count = files.len(),
        "parse_multipart: completed"
    );

    Ok((params, files))
}

/// Stream every part into `params` and `files`.
///
/// Files stored before an error are left in `files` for the caller to remove.
async fn read_parts(
    multipart: &mut Multipart<'_>,
    config: &InputConfig,
    params: &mut ParamList,
    files: &mut UploadList,
) -> Result<()> {
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(|s| s.to_string());
        let field_content_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_default();

        let Some(original_name) = file_name else {
            let value = field.text().await?;
            tracing::debug!(
                field_name = %field_name,
                value_len = value.len(),
                "parse_multipart: parsed form field"
            );
            params.push((field_name, value));
            continue;
        };

        if files.len() >= config.max_file_uploads {
            tracing::debug!(
                field_name = %field_name,
                limit = config.max_file_uploads,
                "parse_multipart: max_file_uploads reached, skipping file"
            );
            continue;
        }

        let data = field.bytes().await?;
        let uploaded_file = store_upload(original_name, field_content_type, data, config).await?;

        tracing::debug!(
            field_name = %field_name,
            file_name = %uploaded_file.name,
            tmp_name = %uploaded_file.tmp_name,
            size = uploaded_file.size,
            error = uploaded_file.error,
            "parse_multipart: parsed uploaded file"
        );

        files.push((field_name, uploaded_file));
    }

    Ok(())
}

/// Remove the stored files of a request whose body failed to parse.
async fn discard_uploads(files: &UploadList) {
    for (_, file) in files {
        if file.tmp_name.is_empty() {
            continue;
        }
        if let Err(e) = tokio::fs::remove_file(&file.tmp_name).await {
            tracing::debug!(
                tmp_name = %file.tmp_name,
                error = %e,
                "parse_multipart: failed to discard upload"
            );
        }
    }
}

/// Write one file part to the upload directory and describe it.
async fn store_upload(
    name: String,
    mime_type: String,
    data: Bytes,
    config: &InputConfig,
) -> Result<UploadedFile> {
    let size = data.len() as u64;

    // Empty file input submitted with the form
    if name.is_empty() {
        return Ok(UploadedFile {
            name,
            mime_type,
            tmp_name: String::new(),
            size: 0,
            error: UploadError::NoFile.code(),
        });
    }

    if size > config.upload_max_filesize {
        return Ok(UploadedFile {
            name,
            mime_type,
            tmp_name: String::new(),
            size,
            error: UploadError::IniSize.code(),
        });
    }

    let tmp_path = config
        .upload_tmp_dir
        .join(format!("php{}", Uuid::new_v4().simple()));

    if let Err(e) = write_file(&tmp_path, &data).await {
        tracing::debug!(
            path = %tmp_path.display(),
            error = %e,
            "parse_multipart: failed to write upload"
        );
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Ok(UploadedFile {
            name,
            mime_type,
            tmp_name: String::new(),
            size,
            error: UploadError::CantWrite.code(),
        });
    }

    Ok(UploadedFile {
        name,
        mime_type,
        tmp_name: tmp_path.to_string_lossy().into_owned(),
        size,
        error: UploadError::Ok.code(),
    })
}

async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(data).await?;
    file.flush().await
}
