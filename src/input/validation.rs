//! Declared validation rules and the validator collaborator.
//!
//! Routing layers describe the inputs a handler expects through an
//! [`AttributeSource`]; the [`InputHandler`] turns those declarations into a
//! typed filter or hands itself to an [`InputValidator`].

use super::handler::InputHandler;
use crate::core::Result;
use crate::types::KeyedList;

/// One declared input: field name, expected type and the full rule string
/// handed to the validator (`"int|min:1"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorAttribute {
    pub name: String,
    pub kind: Option<String>,
    pub full_validator: String,
}

impl ValidatorAttribute {
    pub fn new(name: impl Into<String>, kind: Option<&str>, full_validator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.map(str::to_string),
            full_validator: full_validator.into(),
        }
    }
}

/// Supplies the validation rules declared on the active route handler.
pub trait AttributeSource {
    fn declared_validations(&self) -> Vec<ValidatorAttribute>;
}

impl AttributeSource for [ValidatorAttribute] {
    fn declared_validations(&self) -> Vec<ValidatorAttribute> {
        self.to_vec()
    }
}

impl AttributeSource for Vec<ValidatorAttribute> {
    fn declared_validations(&self) -> Vec<ValidatorAttribute> {
        self.clone()
    }
}

/// Validates the inputs of a parsed request.
pub trait InputValidator {
    /// Inspect `inputs`, returning [`Error::Validation`](crate::core::Error::Validation)
    /// for the first failing field.
    fn validate_inputs(&mut self, inputs: &InputHandler) -> Result<()>;
}

/// Builds a validator from `field -> rule` pairs.
pub trait FromRules {
    fn from_rules(rules: KeyedList<String>) -> Self;
}
