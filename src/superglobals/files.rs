//! `$_FILES` construction in PHP's column-oriented layout.

use super::parser::{insert_path, parse_key_within, DecodeLimits};
use crate::types::{RawArray, RawValue, Scalar, UploadedFile};

/// Column names of a `$_FILES` entry, in PHP's order.
pub const FILE_COLUMNS: [&str; 5] = ["name", "type", "tmp_name", "error", "size"];

/// Build the `$_FILES` array from uploads keyed by raw field name.
///
/// A plain field (`avatar`) becomes one descriptor of five scalars. A
/// bracketed field (`photos[group][]`) becomes five parallel columns, each
/// nested along the bracket path:
///
/// ```text
/// photos => [
///     name     => [group => [0 => 'a.jpg']],
///     type     => [group => [0 => 'image/jpeg']],
///     tmp_name => [group => [0 => '/tmp/php...']],
///     error    => [group => [0 => 0]],
///     size     => [group => [0 => 1024]],
/// ]
/// ```
///
/// Field names nested deeper than `limits.max_depth` are skipped.
pub fn build_files_array<I>(uploads: I, limits: &DecodeLimits) -> RawArray
where
    I: IntoIterator<Item = (String, UploadedFile)>,
{
    let mut files = RawArray::new();

    for (field_name, file) in uploads {
        let (base, segments) = match parse_key_within(&field_name, limits.max_depth) {
            Ok(Some(key)) => key,
            Ok(None) => {
                tracing::debug!(field_name = %field_name, "files: skipping upload with empty field name");
                continue;
            }
            Err(_) => {
                tracing::debug!(
                    max_input_nesting_level = limits.max_depth,
                    "files: upload field nested too deeply, skipping"
                );
                continue;
            }
        };

        let values = column_values(&file);

        if segments.is_empty() {
            let descriptor: RawArray = FILE_COLUMNS
                .iter()
                .zip(values)
                .map(|(column, value)| (*column, RawValue::Scalar(value)))
                .collect();
            files.insert(base, RawValue::Array(descriptor));
            continue;
        }

        if !is_column_group(files.get(&base)) {
            let empty: RawArray = FILE_COLUMNS
                .iter()
                .map(|column| (*column, RawValue::Array(RawArray::new())))
                .collect();
            files.insert(base.clone(), RawValue::Array(empty));
        }

        let Some(RawValue::Array(group)) = files.get_mut(&base) else {
            continue;
        };

        for (column, value) in FILE_COLUMNS.iter().zip(values) {
            if let Some(RawValue::Array(column_array)) = group.get_mut(column) {
                insert_path(column_array, &segments, RawValue::Scalar(value));
            }
        }
    }

    files
}

fn column_values(file: &UploadedFile) -> [Scalar; 5] {
    [
        Scalar::String(file.name.clone()),
        Scalar::String(file.mime_type.clone()),
        Scalar::String(file.tmp_name.clone()),
        Scalar::Int(i64::from(file.error)),
        Scalar::Int(i64::try_from(file.size).unwrap_or(i64::MAX)),
    ]
}

/// Whether an existing entry already has the nested column layout.
fn is_column_group(entry: Option<&RawValue>) -> bool {
    match entry.and_then(RawValue::as_array) {
        Some(group) => FILE_COLUMNS
            .iter()
            .all(|column| matches!(group.get(column), Some(RawValue::Array(_)))),
        None => false,
    }
}
