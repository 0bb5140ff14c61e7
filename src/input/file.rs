//! Uploaded file nodes.

use std::path::Path;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

use crate::core::{Error, Result};
use crate::types::{KeyedList, RawArray, RawValue, UploadError, UploadedFile};

/// File nodes keyed by field name.
pub type FileList = KeyedList<InputFile>;

/// Value held by an [`InputFile`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FileValue {
    /// Placeholder for a field without uploads.
    #[default]
    Null,
    /// One uploaded file.
    File(UploadedFile),
    /// Repeated uploads under one field.
    List(Vec<InputFile>),
    /// Nested field group.
    Map(FileList),
}

/// An uploaded file, or a container of nested uploads.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    index: String,
    value: FileValue,
}

impl InputFile {
    /// Create an empty (null) node.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            value: FileValue::Null,
        }
    }

    /// Wrap one uploaded file.
    pub fn from_upload(index: impl Into<String>, file: UploadedFile) -> Self {
        Self {
            index: index.into(),
            value: FileValue::File(file),
        }
    }

    /// Create a group node holding named children.
    pub fn group(index: impl Into<String>, children: FileList) -> Self {
        Self {
            index: index.into(),
            value: FileValue::Map(children),
        }
    }

    /// Build a file from a flat `$_FILES` descriptor.
    ///
    /// All of `name`, `type`, `tmp_name`, `error` and `size` must be present;
    /// `error` and `size` must be non-negative integers.
    pub fn from_array(index: impl Into<String>, descriptor: &RawArray) -> Result<Self> {
        let file = UploadedFile {
            name: string_field(descriptor, "name")?,
            mime_type: string_field(descriptor, "type")?,
            tmp_name: string_field(descriptor, "tmp_name")?,
            error: int_field(descriptor, "error")
                .and_then(|e| u8::try_from(e).map_err(|_| Error::invalid_upload("error", "out of range")))?,
            size: int_field(descriptor, "size")?,
        };

        Ok(Self::from_upload(index, file))
    }

    #[inline]
    pub fn index(&self) -> &str {
        &self.index
    }

    #[inline]
    pub fn value(&self) -> &FileValue {
        &self.value
    }

    /// Replace the node's value.
    pub fn set_value(&mut self, value: FileValue) -> &mut Self {
        self.value = value;
        self
    }

    /// Append files to this container.
    ///
    /// A null node becomes a list; a single file is promoted to a list
    /// holding itself first; a group keeps children under their own index.
    pub fn add_input_files(&mut self, files: Vec<InputFile>) -> &mut Self {
        match self.value {
            FileValue::Null => self.value = FileValue::List(files),
            FileValue::List(ref mut list) => list.extend(files),
            FileValue::Map(ref mut map) => {
                for file in files {
                    let key = file.index.clone();
                    map.push(key, file);
                }
            }
            FileValue::File(_) => {
                let current = std::mem::take(&mut self.value);
                let mut list = Vec::with_capacity(files.len() + 1);
                list.push(InputFile {
                    index: self.index.clone(),
                    value: current,
                });
                list.extend(files);
                self.value = FileValue::List(list);
            }
        }
        self
    }

    /// Add `file` as a sibling under the same key, turning this node into a
    /// sequence on the first collision.
    pub(crate) fn append_sibling(&mut self, file: InputFile) {
        match self.value {
            FileValue::List(ref mut list) => list.push(file),
            _ => {
                let index = self.index.clone();
                let current = std::mem::replace(self, InputFile::new(index));
                self.value = FileValue::List(vec![current, file]);
            }
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.value, FileValue::Null)
    }

    /// Whether this node is a single uploaded file.
    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self.value, FileValue::File(_))
    }

    #[inline]
    pub fn upload(&self) -> Option<&UploadedFile> {
        match &self.value {
            FileValue::File(file) => Some(file),
            _ => None,
        }
    }

    /// Child nodes in order (list entries or group children).
    pub fn children(&self) -> Vec<&InputFile> {
        match &self.value {
            FileValue::List(list) => list.iter().collect(),
            FileValue::Map(map) => map.values().collect(),
            FileValue::Null | FileValue::File(_) => Vec::new(),
        }
    }

    /// Child of a group by key.
    pub fn get(&self, key: &str) -> Option<&InputFile> {
        match &self.value {
            FileValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Client-side filename.
    pub fn filename(&self) -> Option<&str> {
        self.upload().map(|f| f.name.as_str())
    }

    /// Lowercased extension of the client-side filename.
    pub fn extension(&self) -> Option<String> {
        self.filename()
            .and_then(|name| Path::new(name).extension())
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    pub fn mime(&self) -> Option<&str> {
        self.upload().map(|f| f.mime_type.as_str())
    }

    pub fn tmp_name(&self) -> Option<&str> {
        self.upload().map(|f| f.tmp_name.as_str())
    }

    pub fn size(&self) -> Option<u64> {
        self.upload().map(|f| f.size)
    }

    pub fn error(&self) -> Option<UploadError> {
        self.upload().map(UploadedFile::upload_error)
    }

    /// Whether the upload failed (any code other than `UPLOAD_ERR_OK`).
    pub fn has_error(&self) -> bool {
        self.error().is_some_and(|e| e != UploadError::Ok)
    }

    /// Read the uploaded file from its temporary location.
    pub fn contents(&self) -> Result<Vec<u8>> {
        let tmp = self.usable_tmp_name()?;
        Ok(std::fs::read(tmp)?)
    }

    /// Move the uploaded file to `destination`.
    ///
    /// Falls back to copy + remove when a rename is not possible (for
    /// example across filesystems).
    pub fn move_to(&self, destination: impl AsRef<Path>) -> Result<()> {
        let tmp = self.usable_tmp_name()?;
        let destination = destination.as_ref();

        if std::fs::rename(tmp, destination).is_err() {
            std::fs::copy(tmp, destination)?;
            std::fs::remove_file(tmp)?;
        }

        tracing::debug!(
            index = %self.index,
            from = %tmp,
            to = %destination.display(),
            "input_file: moved upload"
        );
        Ok(())
    }

    fn usable_tmp_name(&self) -> Result<&str> {
        let file = self
            .upload()
            .ok_or_else(|| Error::invalid_upload(self.index.clone(), "not a single file"))?;
        if file.error != 0 || file.tmp_name.is_empty() {
            return Err(Error::invalid_upload(
                self.index.clone(),
                file.upload_error().message(),
            ));
        }
        Ok(&file.tmp_name)
    }

    pub fn to_json(&self) -> Value {
        match &self.value {
            FileValue::Null => Value::Null,
            FileValue::File(file) => serde_json::json!({
                "name": file.name,
                "type": file.mime_type,
                "tmp_name": file.tmp_name,
                "error": file.error,
                "size": file.size,
            }),
            FileValue::List(list) => Value::Array(list.iter().map(InputFile::to_json).collect()),
            FileValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, file)| (k.to_string(), file.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for InputFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.value {
            FileValue::Null => serializer.serialize_none(),
            FileValue::File(file) => file.serialize(serializer),
            FileValue::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for file in list {
                    seq.serialize_element(file)?;
                }
                seq.end()
            }
            FileValue::Map(map) => map.serialize(serializer),
        }
    }
}

fn string_field(descriptor: &RawArray, field: &str) -> Result<String> {
    match descriptor.get(field) {
        Some(RawValue::Scalar(scalar)) => scalar
            .to_php_string()
            .ok_or_else(|| Error::invalid_upload(field, "missing")),
        Some(RawValue::Array(_)) => Err(Error::invalid_upload(field, "expected a scalar")),
        None => Err(Error::invalid_upload(field, "missing")),
    }
}

fn int_field(descriptor: &RawArray, field: &str) -> Result<u64> {
    match descriptor.get(field) {
        Some(RawValue::Scalar(scalar)) => scalar
            .as_u64()
            .ok_or_else(|| Error::invalid_upload(field, "expected a non-negative integer")),
        Some(RawValue::Array(_)) => Err(Error::invalid_upload(field, "expected a scalar")),
        None => Err(Error::invalid_upload(field, "missing")),
    }
}
