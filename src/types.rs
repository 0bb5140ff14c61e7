//! Core value types shared by the platform layer and the input tree.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Key-value pair type for decoded parameters (faster than HashMap for small collections).
pub type ParamList = Vec<(String, String)>;

// =============================================================================
// Keyed List
// =============================================================================

/// Ordered key/value list with PHP array semantics.
///
/// Insertion order is preserved. [`KeyedList::insert`] replaces the first entry
/// with the same key, while [`KeyedList::push`] keeps repeated keys, which is
/// how re-indexed upload slots are represented.
///
/// Lookups by key go through a position index of first occurrences, and the
/// next free integer key is tracked on every write, so appends stay constant
/// time however large the list grows.
#[derive(Clone)]
pub struct KeyedList<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
    next_free: i64,
}

impl<V> Default for KeyedList<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            next_free: 0,
        }
    }
}

impl<V> KeyedList<V> {
    /// Create an empty list.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
            next_free: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the first value stored under `key`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&V> {
        let pos = *self.positions.get(key)?;
        Some(&self.entries[pos].1)
    }

    /// Get a mutable reference to the first value stored under `key`.
    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let pos = *self.positions.get(key)?;
        Some(&mut self.entries[pos].1)
    }

    /// Get the `n`-th (zero based) value stored under a repeated `key`.
    pub fn get_nth(&self, key: &str, n: usize) -> Option<&V> {
        if n == 0 {
            return self.get(key);
        }
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .nth(n)
            .map(|(_, v)| v)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Insert or replace the value under `key`, keeping the original position.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.push(key, value);
                None
            }
        }
    }

    /// Append an entry, even if the key is already present.
    pub fn push(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(index) = int_key(&key) {
            if index >= self.next_free {
                self.next_free = index.saturating_add(1);
            }
        }
        if !self.positions.contains_key(&key) {
            self.positions.insert(key.clone(), self.entries.len());
        }
        self.entries.push((key, value));
    }

    /// Remove the first entry stored under `key`.
    ///
    /// The next free integer key is not lowered, as in PHP.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let pos = *self.positions.get(key)?;
        let (_, value) = self.entries.remove(pos);
        self.reindex();
        Some(value)
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over mutable values in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Consume the list, keeping only the values in order.
    pub fn into_values(self) -> Vec<V> {
        self.entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Next free integer key (PHP `$array[] = ...` semantics).
    #[inline]
    pub fn next_index(&self) -> i64 {
        self.next_free
    }

    fn reindex(&mut self) {
        self.positions.clear();
        for (pos, (key, _)) in self.entries.iter().enumerate() {
            self.positions.entry(key.clone()).or_insert(pos);
        }
    }
}

/// Integer value of a canonical decimal key (`"5"`, `"-3"`; not `"05"` or `"+5"`).
fn int_key(key: &str) -> Option<i64> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && key != "-0";
    if canonical {
        key.parse().ok()
    } else {
        None
    }
}

impl<V: PartialEq> PartialEq for KeyedList<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V: fmt::Debug> fmt::Debug for KeyedList<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> IntoIterator for KeyedList<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for KeyedList<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut list = Self::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            list.push(k, v);
        }
        list
    }
}

impl<V: Serialize> Serialize for KeyedList<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// =============================================================================
// Scalars and raw platform values
// =============================================================================

/// Leaf value of a platform array or an input item.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Borrow the value if it is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// String form of the scalar (PHP string cast); `None` for null.
    pub fn to_php_string(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(true) => Some("1".to_string()),
            Scalar::Bool(false) => Some(String::new()),
            Scalar::Int(i) => Some(i.to_string()),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::String(s) => Some(s.clone()),
        }
    }

    /// Non-negative integer form, accepting integer strings.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Int(i) => u64::try_from(*i).ok(),
            Scalar::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Int(i) => Value::from(*i),
            Scalar::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// Raw value of a platform array (`$_GET`, `$_POST`, `$_FILES`, decoded JSON).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Scalar(Scalar),
    Array(RawArray),
}

/// Ordered platform array.
pub type RawArray = KeyedList<RawValue>;

impl RawValue {
    #[inline]
    pub fn as_array(&self) -> Option<&RawArray> {
        match self {
            RawValue::Array(a) => Some(a),
            RawValue::Scalar(_) => None,
        }
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            RawValue::Scalar(s) => Some(s),
            RawValue::Array(_) => None,
        }
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, RawValue::Array(_))
    }

    pub fn to_json(&self) -> Value {
        match self {
            RawValue::Scalar(s) => s.to_json(),
            RawValue::Array(a) => Value::Object(
                a.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Scalar> for RawValue {
    fn from(s: Scalar) -> Self {
        RawValue::Scalar(s)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Scalar(s.into())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Scalar(s.into())
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Scalar(i.into())
    }
}

impl From<RawArray> for RawValue {
    fn from(a: RawArray) -> Self {
        RawValue::Array(a)
    }
}

/// JSON documents decode the way `json_decode($body, true)` does:
/// objects and lists both become arrays, lists keyed `"0".."n"`.
impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Scalar(Scalar::Null),
            Value::Bool(b) => RawValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Scalar(Scalar::Int(i)),
                None => RawValue::Scalar(Scalar::Float(n.as_f64().unwrap_or_default())),
            },
            Value::String(s) => RawValue::Scalar(Scalar::String(s)),
            Value::Array(list) => RawValue::Array(
                list.into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), RawValue::from(v)))
                    .collect(),
            ),
            Value::Object(map) => RawValue::Array(
                map.into_iter()
                    .map(|(k, v)| (k, RawValue::from(v)))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Uploaded File
// =============================================================================

/// Represents an uploaded file from multipart form data.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UploadedFile {
    /// Original filename
    pub name: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Temporary file path on disk
    pub tmp_name: String,
    /// File size in bytes
    pub size: u64,
    /// PHP upload error code (0 = success)
    pub error: u8,
}

impl UploadedFile {
    /// Upload error as a typed value.
    #[inline]
    pub fn upload_error(&self) -> UploadError {
        UploadError::from_code(self.error)
    }
}

/// PHP upload error enumeration (`UPLOAD_ERR_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    Ok,
    IniSize,
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
    Unknown(u8),
}

impl UploadError {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => UploadError::Ok,
            1 => UploadError::IniSize,
            2 => UploadError::FormSize,
            3 => UploadError::Partial,
            4 => UploadError::NoFile,
            6 => UploadError::NoTmpDir,
            7 => UploadError::CantWrite,
            8 => UploadError::Extension,
            other => UploadError::Unknown(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            UploadError::Ok => 0,
            UploadError::IniSize => 1,
            UploadError::FormSize => 2,
            UploadError::Partial => 3,
            UploadError::NoFile => 4,
            UploadError::NoTmpDir => 6,
            UploadError::CantWrite => 7,
            UploadError::Extension => 8,
            UploadError::Unknown(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            UploadError::Ok => "There is no error, the file uploaded with success",
            UploadError::IniSize => "The uploaded file exceeds the upload_max_filesize limit",
            UploadError::FormSize => "The uploaded file exceeds the MAX_FILE_SIZE form limit",
            UploadError::Partial => "The uploaded file was only partially uploaded",
            UploadError::NoFile => "No file was uploaded",
            UploadError::NoTmpDir => "Missing a temporary folder",
            UploadError::CantWrite => "Failed to write file to disk",
            UploadError::Extension => "A PHP extension stopped the file upload",
            UploadError::Unknown(_) => "Unknown upload error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_list_insert_replaces_in_place() {
        let mut list: KeyedList<i64> = KeyedList::new();
        list.insert("a", 1);
        list.insert("b", 2);
        assert_eq!(list.insert("a", 3), Some(1));

        let keys: Vec<&str> = list.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(list.get("a"), Some(&3));
    }

    #[test]
    fn test_keyed_list_push_keeps_repeated_keys() {
        let mut list: KeyedList<&str> = KeyedList::new();
        list.push("0", "first");
        list.push("0", "second");

        assert_eq!(list.len(), 2);
        assert_eq!(list.get("0"), Some(&"first"));
        assert_eq!(list.get_nth("0", 1), Some(&"second"));
        assert_eq!(list.get_nth("0", 2), None);
    }

    #[test]
    fn test_next_index() {
        let mut list: KeyedList<i64> = KeyedList::new();
        assert_eq!(list.next_index(), 0);
        list.push("0", 1);
        list.push("name", 1);
        list.push("5", 1);
        assert_eq!(list.next_index(), 6);

        // Non-canonical numeric strings are string keys
        list.push("07", 1);
        list.push("+9", 1);
        list.push("-2", 1);
        assert_eq!(list.next_index(), 6);

        // Removing the highest key does not lower the counter
        list.remove("5");
        assert_eq!(list.next_index(), 6);
    }

    #[test]
    fn test_keyed_list_remove_keeps_lookups_consistent() {
        let mut list: KeyedList<i64> = ["a", "b", "c", "b"]
            .into_iter()
            .enumerate()
            .map(|(i, k)| (k, i as i64))
            .collect();

        assert_eq!(list.remove("a"), Some(0));
        assert_eq!(list.get("b"), Some(&1));
        assert_eq!(list.get("c"), Some(&2));
        assert_eq!(list.remove("b"), Some(1));
        assert_eq!(list.get("b"), Some(&3));
        assert!(!list.contains_key("a"));
        let expected: KeyedList<i64> = [("c", 2i64), ("b", 3)].into_iter().collect();
        assert_eq!(list, expected);
    }

    #[test]
    fn test_keyed_list_appends_many_entries() {
        let mut list: KeyedList<i64> = KeyedList::new();
        for i in 0..100_000i64 {
            let key = list.next_index().to_string();
            list.insert(key, i);
        }

        assert_eq!(list.len(), 100_000);
        assert_eq!(list.next_index(), 100_000);
        assert_eq!(list.get("99999"), Some(&99_999));
    }

    #[test]
    fn test_raw_value_from_json_list() {
        let raw = RawValue::from(serde_json::json!({"tags": ["a", "b"], "n": 5}));
        let array = raw.as_array().unwrap();
        let tags = array.get("tags").unwrap().as_array().unwrap();

        assert_eq!(tags.get("0"), Some(&RawValue::from("a")));
        assert_eq!(tags.get("1"), Some(&RawValue::from("b")));
        assert_eq!(array.get("n"), Some(&RawValue::from(5i64)));
    }

    #[test]
    fn test_scalar_as_u64() {
        assert_eq!(Scalar::Int(12).as_u64(), Some(12));
        assert_eq!(Scalar::from("42").as_u64(), Some(42));
        assert_eq!(Scalar::Int(-1).as_u64(), None);
        assert_eq!(Scalar::from("abc").as_u64(), None);
        assert_eq!(Scalar::Null.as_u64(), None);
    }

    #[test]
    fn test_upload_error_codes() {
        assert_eq!(UploadError::from_code(0), UploadError::Ok);
        assert_eq!(UploadError::from_code(4), UploadError::NoFile);
        assert_eq!(UploadError::from_code(5), UploadError::Unknown(5));
        assert_eq!(UploadError::CantWrite.code(), 7);
    }
}
