//! Value coercion toward a named type.

use super::item::{InputItem, InputValue, ItemList};
use crate::types::Scalar;

/// Coerces an item's stored value in place.
///
/// Scalar rules applied to a container coerce every nested leaf.
pub struct ValueParser<'a> {
    value: &'a mut InputValue,
}

impl<'a> ValueParser<'a> {
    pub fn new(value: &'a mut InputValue) -> Self {
        Self { value }
    }

    /// Apply the coercion named by `setting` and return the new value.
    ///
    /// Known settings: `string`, `int`/`integer`, `float`/`double`,
    /// `bool`/`boolean`, `array`, `email`, `raw`/`mixed`. Unknown settings
    /// leave the value untouched.
    pub fn parse_from_setting(self, setting: &str) -> &'a InputValue {
        match setting.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => self.map_leaves(to_string),
            "int" | "integer" => self.map_leaves(to_int),
            "float" | "double" => self.map_leaves(to_float),
            "bool" | "boolean" => self.map_leaves(to_bool),
            "email" => self.map_leaves(to_email),
            "array" => self.to_array(),
            "raw" | "mixed" => self.value,
            other => {
                tracing::debug!(setting = %other, "value_parser: unknown setting, value unchanged");
                self.value
            }
        }
    }

    pub fn to_int(self) -> &'a InputValue {
        self.map_leaves(to_int)
    }

    pub fn to_float(self) -> &'a InputValue {
        self.map_leaves(to_float)
    }

    pub fn to_bool(self) -> &'a InputValue {
        self.map_leaves(to_bool)
    }

    pub fn to_string(self) -> &'a InputValue {
        self.map_leaves(to_string)
    }

    pub fn to_email(self) -> &'a InputValue {
        self.map_leaves(to_email)
    }

    /// Wrap a scalar into a one-element container; null becomes empty.
    pub fn to_array(self) -> &'a InputValue {
        if let InputValue::Scalar(scalar) = self.value {
            let mut items = ItemList::new();
            if !scalar.is_null() {
                let scalar = std::mem::take(scalar);
                items.push("0", InputItem::new("0", scalar));
            }
            *self.value = InputValue::Items(items);
        }
        self.value
    }

    fn map_leaves(self, f: fn(&Scalar) -> Scalar) -> &'a InputValue {
        map_value(self.value, f);
        self.value
    }
}

fn map_value(value: &mut InputValue, f: fn(&Scalar) -> Scalar) {
    match value {
        InputValue::Scalar(scalar) => *scalar = f(scalar),
        InputValue::Items(items) => {
            for item in items.values_mut() {
                item.parser().map_leaves(f);
            }
        }
    }
}

fn to_string(scalar: &Scalar) -> Scalar {
    match scalar.to_php_string() {
        Some(s) => Scalar::String(s),
        None => Scalar::Null,
    }
}

fn to_int(scalar: &Scalar) -> Scalar {
    match scalar {
        Scalar::Null => Scalar::Null,
        Scalar::Bool(b) => Scalar::Int(i64::from(*b)),
        Scalar::Int(i) => Scalar::Int(*i),
        Scalar::Float(f) if f.is_finite() => Scalar::Int(f.trunc() as i64),
        Scalar::Float(_) => Scalar::Null,
        Scalar::String(s) => leading_int(s).map_or(Scalar::Null, Scalar::Int),
    }
}

fn to_float(scalar: &Scalar) -> Scalar {
    match scalar {
        Scalar::Null => Scalar::Null,
        Scalar::Bool(b) => Scalar::Float(if *b { 1.0 } else { 0.0 }),
        Scalar::Int(i) => Scalar::Float(*i as f64),
        Scalar::Float(f) => Scalar::Float(*f),
        Scalar::String(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Scalar::Float(f),
                _ => leading_int(trimmed).map_or(Scalar::Null, |i| Scalar::Float(i as f64)),
            }
        }
    }
}

fn to_bool(scalar: &Scalar) -> Scalar {
    match scalar {
        Scalar::Null => Scalar::Null,
        Scalar::Bool(b) => Scalar::Bool(*b),
        Scalar::Int(i) => Scalar::Bool(*i != 0),
        Scalar::Float(f) => Scalar::Bool(*f != 0.0),
        Scalar::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Scalar::Bool(true),
            "0" | "false" | "off" | "no" | "" => Scalar::Bool(false),
            _ => Scalar::Null,
        },
    }
}

fn to_email(scalar: &Scalar) -> Scalar {
    let Some(s) = scalar.as_str() else {
        return Scalar::Null;
    };
    let email = s.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Scalar::String(email)
        }
        _ => Scalar::Null,
    }
}

/// Leading `[+-]digits` of a trimmed string ("12abc" is 12).
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}
