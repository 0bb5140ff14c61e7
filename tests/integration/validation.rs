//! Typed filters and declared validation rules.

use crate::helpers::*;
use php_input::config::{InputConfig, LogFormat, LoggingConfig};
use php_input::input::{
    AttributeSource, Filter, FromRules, InputHandler, InputValidator, SourceFilter,
    ValidatorAttribute,
};
use php_input::types::KeyedList;
use php_input::{Error, Result};
use serde_json::{json, Value};

/// Route metadata declaring the inputs of a "create user" endpoint.
struct CreateUser;

impl AttributeSource for CreateUser {
    fn declared_validations(&self) -> Vec<ValidatorAttribute> {
        vec![
            ValidatorAttribute::new("age", Some("int"), "int|required"),
            ValidatorAttribute::new("email", Some("email"), "email|required"),
            ValidatorAttribute::new("newsletter", Some("bool"), "bool"),
            ValidatorAttribute::new("nickname", None, "string"),
        ]
    }
}

/// Validator checking `required` rules only.
#[derive(Debug, Default)]
struct Required {
    rules: KeyedList<String>,
    checked: usize,
}

impl FromRules for Required {
    fn from_rules(rules: KeyedList<String>) -> Self {
        Self { rules, checked: 0 }
    }
}

impl InputValidator for Required {
    fn validate_inputs(&mut self, inputs: &InputHandler) -> Result<()> {
        for (name, rule) in self.rules.iter() {
            self.checked += 1;
            if rule.split('|').any(|r| r == "required") && !inputs.exists(name, SourceFilter::any()) {
                return Err(Error::validation(name, "field is required"));
            }
        }
        Ok(())
    }
}

/// Test typed filter coerces returned values only
#[test]
fn test_typed_filter() {
    let input = InputHandler::decode(get("/?a=7+apples&c=1"), &InputConfig::default());

    let values = input.values(Filter::typed([("a", Some("int")), ("b", None::<&str>)]));

    assert_eq!(values.len(), 2);
    assert_eq!(values.get("a"), Some(&json!(7)));
    assert_eq!(values.get("b"), Some(&Value::Null));
    assert_eq!(input.value("a", Value::Null, "get"), json!("7 apples"));
}

/// Test declared attributes drive coercion
#[test]
fn test_require_attribute_values() {
    let input = InputHandler::decode(
        form("/users", "age=31&email=+Ada%40Example.ORG+&newsletter=yes"),
        &InputConfig::default(),
    );

    let values = input.require_attribute_values(&CreateUser);

    let keys: Vec<&str> = values.keys().collect();
    assert_eq!(keys, vec!["age", "email", "newsletter", "nickname"]);
    assert_eq!(values.get("age"), Some(&json!(31)));
    assert_eq!(values.get("email"), Some(&json!("ada@example.org")));
    assert_eq!(values.get("newsletter"), Some(&json!(true)));
    assert_eq!(values.get("nickname"), Some(&Value::Null));

    let nodes = input.require_attributes(&CreateUser);
    assert!(nodes.get("nickname").unwrap().is_null());
}

/// Test default validator is built from declared rules
#[test]
fn test_validate_attributes_default() {
    let input = InputHandler::decode(form("/users", "age=31&email=a%40b.c"), &InputConfig::default());

    let validator: Required = input.validate_attributes(&CreateUser, None).unwrap();
    assert_eq!(validator.rules.len(), 4);
    assert_eq!(validator.checked, 4);
    assert_eq!(validator.rules.get("email").map(String::as_str), Some("email|required"));
}

/// Test validation failure surfaces the field
#[test]
fn test_validate_attributes_failure() {
    let input = InputHandler::decode(form("/users", "age=31&email=++"), &InputConfig::default());

    let err = input
        .validate_attributes::<_, Required>(&CreateUser, None)
        .unwrap_err();

    match err {
        Error::Validation { field, message } => {
            assert_eq!(field, "email");
            assert_eq!(message, "field is required");
        }
        other => panic!("unexpected error: {}", other),
    }
}

/// Test attributes from a plain list
#[test]
fn test_attribute_list_source() {
    let input = InputHandler::decode(get("/?page=2"), &InputConfig::default());
    let attrs = [ValidatorAttribute::new("page", Some("int"), "int")];

    let values = input.require_attribute_values(&attrs[..]);
    assert_eq!(values.get("page"), Some(&json!(2)));

    let supplied = Required::default();
    let validator = input.validate_attributes(&attrs[..], Some(supplied)).unwrap();
    assert!(validator.rules.is_empty());
}

/// Test logging initialization is idempotent
#[test]
fn test_logging_init() {
    let config = LoggingConfig {
        filter: "php_input=debug".into(),
        service_name: "php_input-test".into(),
        format: LogFormat::Json,
    };

    php_input::logging::init(&config);
    assert!(!php_input::logging::init(&config));

    // Logged paths still behave with a subscriber installed
    let input = InputHandler::decode(json("POST", "/", "{broken"), &InputConfig::default());
    assert!(input.data("anything").value().is_null());
}
