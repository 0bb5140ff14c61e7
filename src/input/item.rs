//! Input items: named scalar-or-nested values from `$_GET`, `$_POST` or a JSON body.

use serde::ser::{Serialize, Serializer};
use serde_json::Value;

use super::parser::parse_input_items;
use super::value_parser::ValueParser;
use crate::types::{KeyedList, RawValue, Scalar};

/// Child items of a container, keyed by name.
pub type ItemList = KeyedList<InputItem>;

/// Value held by an [`InputItem`]: a leaf scalar or nested items, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Scalar(Scalar),
    Items(ItemList),
}

impl Default for InputValue {
    fn default() -> Self {
        InputValue::Scalar(Scalar::Null)
    }
}

impl InputValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Scalar(Scalar::Null))
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            InputValue::Scalar(s) => Some(s),
            InputValue::Items(_) => None,
        }
    }

    #[inline]
    pub fn as_items(&self) -> Option<&ItemList> {
        match self {
            InputValue::Items(items) => Some(items),
            InputValue::Scalar(_) => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn to_json(&self) -> Value {
        match self {
            InputValue::Scalar(s) => s.to_json(),
            InputValue::Items(items) => Value::Object(
                items
                    .iter()
                    .map(|(k, item)| (k.to_string(), item.value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for InputValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InputValue::Scalar(s) => s.serialize(serializer),
            InputValue::Items(items) => items.serialize(serializer),
        }
    }
}

impl From<Scalar> for InputValue {
    fn from(s: Scalar) -> Self {
        InputValue::Scalar(s)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Scalar(s.into())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Scalar(s.into())
    }
}

impl From<i64> for InputValue {
    fn from(i: i64) -> Self {
        InputValue::Scalar(i.into())
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        InputValue::Scalar(b.into())
    }
}

impl From<ItemList> for InputValue {
    fn from(items: ItemList) -> Self {
        InputValue::Items(items)
    }
}

impl From<&RawValue> for InputValue {
    fn from(raw: &RawValue) -> Self {
        match raw {
            RawValue::Scalar(s) => InputValue::Scalar(s.clone()),
            RawValue::Array(array) => InputValue::Items(parse_input_items(array)),
        }
    }
}

/// Defaults and injected values are accepted as JSON.
impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        InputValue::from(&RawValue::from(value))
    }
}

/// A named input value.
#[derive(Debug, Clone, PartialEq)]
pub struct InputItem {
    name: String,
    value: InputValue,
}

impl InputItem {
    /// Create an item with a value.
    pub fn new(name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a "not found" item holding null.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: InputValue::default(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &InputValue {
        &self.value
    }

    /// Child item of a container.
    pub fn get(&self, key: &str) -> Option<&InputItem> {
        self.value.as_items().and_then(|items| items.get(key))
    }

    /// Coercion helper bound to this item.
    ///
    /// ```rust,ignore
    /// item.parser().parse_from_setting("int");
    /// ```
    #[inline]
    pub fn parser(&mut self) -> ValueParser<'_> {
        ValueParser::new(&mut self.value)
    }

    #[inline]
    pub fn to_json(&self) -> Value {
        self.value.to_json()
    }
}

impl Serialize for InputItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}
