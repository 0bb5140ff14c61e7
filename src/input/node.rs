//! Unified node type returned by cross-source lookups.

use serde::Serialize;
use serde_json::Value;

use super::file::InputFile;
use super::item::InputItem;

/// An item from `$_GET`/body data or a file from `$_FILES`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InputNode {
    Item(InputItem),
    File(InputFile),
}

impl InputNode {
    /// Field name (item name or file index).
    pub fn name(&self) -> &str {
        match self {
            InputNode::Item(item) => item.name(),
            InputNode::File(file) => file.index(),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            InputNode::Item(item) => item.value().is_null(),
            InputNode::File(file) => file.is_null(),
        }
    }

    #[inline]
    pub fn as_item(&self) -> Option<&InputItem> {
        match self {
            InputNode::Item(item) => Some(item),
            InputNode::File(_) => None,
        }
    }

    #[inline]
    pub fn as_file(&self) -> Option<&InputFile> {
        match self {
            InputNode::File(file) => Some(file),
            InputNode::Item(_) => None,
        }
    }

    /// Coerce the stored value toward `rule`. Files are left as they are.
    pub fn coerce(&mut self, rule: &str) {
        match self {
            InputNode::Item(item) => {
                item.parser().parse_from_setting(rule);
            }
            InputNode::File(file) => {
                tracing::debug!(field = %file.index(), rule = %rule, "input_node: coercion skipped for file");
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            InputNode::Item(item) => item.to_json(),
            InputNode::File(file) => file.to_json(),
        }
    }
}

impl From<InputItem> for InputNode {
    fn from(item: InputItem) -> Self {
        InputNode::Item(item)
    }
}

impl From<InputFile> for InputNode {
    fn from(file: InputFile) -> Self {
        InputNode::File(file)
    }
}

/// Whether a resolved value counts as "not provided".
///
/// Null, empty arrays/objects and strings that are empty after trimming are
/// absent; every other value, including `0`, `false` and `"0"`, is present.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
