//! Multipart uploads through InputHandler.

use crate::helpers::*;
use php_input::input::{FileValue, InputFile, SourceFilter};
use php_input::types::UploadError;
use php_input::{Error, InputHandler};
use serde_json::json;

/// Test single upload plus form fields
#[tokio::test]
async fn test_single_upload() {
    let uploads = UploadDir::new();
    let req = MultipartBuilder::new()
        .field("title", "holiday")
        .file("avatar", "Me.PNG", "image/png", "pngdata")
        .into_request("/profile");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();

    assert_eq!(input.data("title").value().as_str(), Some("holiday"));

    let avatar = input.file("avatar");
    assert!(avatar.is_file());
    assert_eq!(avatar.filename(), Some("Me.PNG"));
    assert_eq!(avatar.extension().as_deref(), Some("png"));
    assert_eq!(avatar.mime(), Some("image/png"));
    assert_eq!(avatar.size(), Some(7));
    assert!(!avatar.has_error());
    assert_eq!(avatar.contents().unwrap(), b"pngdata");
    assert!(avatar.tmp_name().unwrap().starts_with(uploads.dir.path().to_str().unwrap()));
    assert_eq!(uploads.stored_files(), 1);
}

/// Test stored uploads are deleted with the handler
#[tokio::test]
async fn test_uploads_removed_on_drop() {
    let uploads = UploadDir::new();
    let req = MultipartBuilder::new()
        .file("docs[]", "a.txt", "text/plain", "a")
        .file("docs[]", "b.txt", "text/plain", "b")
        .into_request("/");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();
    let first = input.file("docs").children()[0].clone();
    assert_eq!(uploads.stored_files(), 2);

    drop(input);

    assert_eq!(uploads.stored_files(), 0);
    assert!(first.contents().is_err());
}

/// Test a moved upload survives the handler
#[tokio::test]
async fn test_moved_upload_survives_drop() {
    let uploads = UploadDir::new();
    let target = tempfile::tempdir().unwrap();
    let req = MultipartBuilder::new()
        .file("keep", "keep.txt", "text/plain", "kept")
        .file("tmp", "tmp.txt", "text/plain", "gone")
        .into_request("/");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();
    let destination = target.path().join("keep.txt");
    input.file("keep").move_to(&destination).unwrap();
    drop(input);

    assert_eq!(uploads.stored_files(), 0);
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "kept");
}

/// Test a truncated body leaves nothing in the upload directory
#[tokio::test]
async fn test_truncated_body_discards_uploads() {
    let uploads = UploadDir::new();
    let body = "--BOUNDARY\r\n\
Content-Disposition: form-data; name=\"a\"; filename=\"a.txt\"\r\n\r\n\
stored\r\n\
--BOUNDARY\r\n\
Content-Disposition: form-data; name=\"b\"; filename=\"b.txt\"\r\n\r\n\
cut off";
    let req = request(
        "POST",
        "/",
        Some("multipart/form-data; boundary=BOUNDARY"),
        body.to_string(),
    );

    let result = InputHandler::from_request(req, &uploads.config).await;

    assert!(result.is_err());
    assert_eq!(uploads.stored_files(), 0);
}

/// Test indexed uploads become a sequence
#[tokio::test]
async fn test_indexed_uploads() {
    let uploads = UploadDir::new();
    let req = MultipartBuilder::new()
        .file("photos[]", "a.jpg", "image/jpeg", "a")
        .file("photos[]", "b.jpg", "image/jpeg", "bb")
        .file("photos[]", "c.jpg", "image/jpeg", "ccc")
        .into_request("/gallery");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();

    let photos = input.file("photos");
    let FileValue::List(slots) = photos.value() else {
        panic!("expected a sequence, got {:?}", photos.value());
    };
    let names: Vec<_> = slots.iter().filter_map(InputFile::filename).collect();
    assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    assert_eq!(slots[2].size(), Some(3));

    // $_FILES keeps PHP's column layout
    let original = input.original_file().get("photos").and_then(|v| v.as_array()).unwrap();
    let columns: Vec<&str> = original.keys().collect();
    assert_eq!(columns, vec!["name", "type", "tmp_name", "error", "size"]);
}

/// Test nested upload groups keep their keys
#[tokio::test]
async fn test_nested_upload_groups() {
    let uploads = UploadDir::new();
    let req = MultipartBuilder::new()
        .file("docs[contract][]", "c1.pdf", "application/pdf", "1")
        .file("docs[contract][]", "c2.pdf", "application/pdf", "2")
        .file("docs[id]", "id.pdf", "application/pdf", "3")
        .into_request("/apply");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();

    let docs = input.file("docs");
    let slots = docs.children();
    assert_eq!(slots.len(), 2);

    let contract = slots[0];
    assert_eq!(contract.index(), "contract");
    assert_eq!(contract.get("0").and_then(InputFile::filename), Some("c1.pdf"));
    assert_eq!(contract.get("1").and_then(InputFile::filename), Some("c2.pdf"));

    assert_eq!(slots[1].index(), "id");
    assert_eq!(slots[1].filename(), Some("id.pdf"));
}

/// Test upload error codes
#[tokio::test]
async fn test_upload_errors() {
    let mut uploads = UploadDir::new();
    uploads.config = uploads.config.clone().with_upload_max_filesize(4);
    let req = MultipartBuilder::new()
        .file("big", "big.bin", "application/octet-stream", "0123456789")
        .file("none", "", "application/octet-stream", "")
        .into_request("/");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();

    let big = input.file("big");
    assert_eq!(big.error(), Some(UploadError::IniSize));
    assert!(big.has_error());
    assert!(matches!(big.contents(), Err(Error::InvalidUpload { .. })));

    assert_eq!(input.file("none").error(), Some(UploadError::NoFile));
    assert_eq!(uploads.stored_files(), 0);
}

/// Test max_file_uploads drops extra files
#[tokio::test]
async fn test_max_file_uploads() {
    let mut uploads = UploadDir::new();
    uploads.config = uploads.config.clone().with_max_file_uploads(2);
    let req = MultipartBuilder::new()
        .file("f[]", "1.txt", "text/plain", "1")
        .file("f[]", "2.txt", "text/plain", "2")
        .file("f[]", "3.txt", "text/plain", "3")
        .into_request("/");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();

    assert_eq!(input.file("f").children().len(), 2);
    assert_eq!(uploads.stored_files(), 2);
}

/// Test moving an upload out of the temp directory
#[tokio::test]
async fn test_move_upload() {
    let uploads = UploadDir::new();
    let target = tempfile::tempdir().unwrap();
    let req = MultipartBuilder::new()
        .file("doc", "notes.txt", "text/plain", "hello")
        .into_request("/");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();
    let destination = target.path().join("notes.txt");
    input.file("doc").move_to(&destination).unwrap();

    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "hello");
    assert_eq!(uploads.stored_files(), 0);
}

/// Test files participate in find/value/all
#[tokio::test]
async fn test_files_in_lookups() {
    let uploads = UploadDir::new();
    let req = MultipartBuilder::new()
        .field("avatar_alt", "me")
        .file("avatar", "me.png", "image/png", "x")
        .into_request("/");

    let input = InputHandler::from_request(req, &uploads.config).await.unwrap();

    let node = input.find("avatar", SourceFilter::any());
    assert_eq!(node.as_file().and_then(InputFile::filename), Some("me.png"));
    assert!(input.exists("avatar", "file"));
    assert!(!input.exists("avatar", ["get", "post"]));

    let value = input.value("avatar", serde_json::Value::Null, "file");
    assert_eq!(value["name"], json!("me.png"));
    assert_eq!(value["error"], json!(0));
}

/// Test multipart without a boundary is rejected
#[tokio::test]
async fn test_missing_boundary() {
    let uploads = UploadDir::new();
    let req = request("POST", "/", Some("multipart/form-data"), "x".to_string());

    let result = InputHandler::from_request(req, &uploads.config).await;
    assert!(matches!(result, Err(Error::InvalidRequest(_))));
}
