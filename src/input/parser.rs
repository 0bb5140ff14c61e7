//! Platform arrays to input item trees.

use super::item::{InputItem, InputValue, ItemList};
use crate::types::{RawArray, RawValue};

/// Convert a platform array into named items.
///
/// Nested arrays are built depth-first, so children are complete before the
/// parent item is created. Never fails.
pub fn parse_input_items(array: &RawArray) -> ItemList {
    let mut list = ItemList::with_capacity(array.len());

    for (key, value) in array.iter() {
        let value = match value {
            RawValue::Array(nested) => InputValue::Items(parse_input_items(nested)),
            RawValue::Scalar(scalar) => InputValue::Scalar(scalar.clone()),
        };
        list.insert(key, InputItem::new(key, value));
    }

    list
}
