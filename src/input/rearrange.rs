//! `$_FILES` rearrangement.
//!
//! PHP exposes nested uploads column-wise: for `photos[group][0]` the field
//! `photos` holds five parallel arrays (`name`, `type`, `tmp_name`, `error`,
//! `size`) that share one key structure. This module turns that layout into
//! one [`InputFile`] per upload slot, keeping the nesting keys.

use std::collections::HashMap;

use super::file::{FileList, InputFile};
use crate::superglobals::FILE_COLUMNS;
use crate::types::{RawArray, RawValue};

/// The five parallel columns at one nesting level, in [`FILE_COLUMNS`] order.
///
/// `name` (index 0) is the shape template; the others may be missing, in
/// which case the slots reading them fail to build.
type Columns<'a> = [Option<&'a RawArray>; 5];

/// Parse a `$_FILES` array into file nodes keyed by field name.
///
/// - a field without a `name` entry is a plain group and is parsed
///   recursively, with `parent_key` set to the field;
/// - a field with a scalar `name` is one upload, labelled with the parent
///   key when there is one;
/// - a field with a nested `name` is rearranged and wrapped in a container
///   holding the resulting slots in order.
///
/// Broken descriptors are dropped without affecting their siblings.
pub fn parse_files(files: &RawArray, parent_key: Option<&str>) -> FileList {
    let mut list = FileList::with_capacity(files.len());

    for (key, value) in files.iter() {
        let Some(entry) = value.as_array() else {
            tracing::debug!(field = %key, "parse_files: skipping non-array entry");
            continue;
        };

        match entry.get("name") {
            None => {
                let children = parse_files(entry, Some(key));
                list.insert(key, InputFile::group(key, children));
            }
            Some(RawValue::Scalar(_)) => {
                let index = parent_key.unwrap_or(key);
                match InputFile::from_array(index, entry) {
                    Ok(file) => {
                        list.insert(key, file);
                    }
                    Err(e) => {
                        tracing::debug!(field = %key, error = %e, "parse_files: skipping invalid upload");
                    }
                }
            }
            Some(RawValue::Array(_)) => {
                let mut path = vec![key.to_string()];
                let slots = rearrange(&mut path, columns_of(entry)).into_values();

                // Repeated top-level field: merge into the existing container.
                if let Some(existing) = list.get_mut(key) {
                    existing.add_input_files(slots);
                } else {
                    let mut container = InputFile::new(key);
                    container.add_input_files(slots);
                    list.push(key, container);
                }
            }
        }
    }

    list
}

/// Walk one nesting level of the parallel columns.
///
/// `path` holds the keys leading here; its first element is consumed as the
/// fallback label for slots with an empty key.
fn rearrange(path: &mut Vec<String>, columns: Columns<'_>) -> FileList {
    let original_index = if path.is_empty() {
        String::new()
    } else {
        path.remove(0)
    };

    let mut output = FileList::new();
    let Some(names) = columns[0] else {
        return output;
    };

    // Occurrence count per key, so repeated keys pair up positionally.
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (key, value) in names.iter() {
        let occurrence = {
            let count = seen.entry(key).or_insert(0);
            *count += 1;
            *count - 1
        };

        match value {
            RawValue::Scalar(_) => {
                let label = if key.is_empty() && !original_index.is_empty() {
                    original_index.as_str()
                } else {
                    key
                };

                let descriptor = slot_descriptor(&columns, key, occurrence);
                match InputFile::from_array(label, &descriptor) {
                    Ok(file) => {
                        tracing::trace!(key = %key, label = %label, "rearrange: built file slot");
                        store(&mut output, key, file);
                    }
                    Err(e) => {
                        tracing::debug!(
                            field = %original_index,
                            key = %key,
                            error = %e,
                            "rearrange: skipping invalid upload slot"
                        );
                    }
                }
            }
            RawValue::Array(_) => {
                path.push(key.to_string());
                let children = rearrange(path, descend(&columns, key, occurrence));
                store(&mut output, key, InputFile::group(key, children));
            }
        }
    }

    output
}

/// Store a slot, promoting the existing entry to a sequence on key collision.
fn store(output: &mut FileList, key: &str, file: InputFile) {
    match output.get_mut(key) {
        Some(existing) => existing.append_sibling(file),
        None => output.push(key, file),
    }
}

fn columns_of(entry: &RawArray) -> Columns<'_> {
    FILE_COLUMNS.map(|column| entry.get(column).and_then(RawValue::as_array))
}

fn descend<'a>(columns: &Columns<'a>, key: &str, occurrence: usize) -> Columns<'a> {
    (*columns).map(|column| {
        column
            .and_then(|c| c.get_nth(key, occurrence))
            .and_then(RawValue::as_array)
    })
}

/// Flat descriptor for one slot, read across the parallel columns.
fn slot_descriptor(columns: &Columns<'_>, key: &str, occurrence: usize) -> RawArray {
    FILE_COLUMNS
        .iter()
        .zip(columns.iter())
        .filter_map(|(name, column)| {
            column
                .and_then(|c| c.get_nth(key, occurrence))
                .map(|value| (*name, value.clone()))
        })
        .collect()
}
