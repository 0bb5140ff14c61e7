//! Query string and body decoding through InputHandler.

use crate::helpers::*;
use php_input::config::InputConfig;
use php_input::input::{Filter, InputValue, SourceFilter};
use php_input::types::RawValue;
use php_input::InputHandler;
use serde_json::{json, Value};

/// Test nested bracket query parameters
#[test]
fn test_query_brackets() {
    let input = InputHandler::decode(
        get("/search?q=rust&filter[lang][]=en&filter[lang][]=de&filter[year]=2024"),
        &InputConfig::default(),
    );

    assert_eq!(input.value("q", Value::Null, "get"), json!("rust"));
    assert_eq!(
        input.value("filter", Value::Null, SourceFilter::any()),
        json!({"lang": {"0": "en", "1": "de"}, "year": "2024"})
    );

    let filter = input.get("filter");
    let lang = filter.get("lang").expect("lang group");
    assert_eq!(lang.get("1").and_then(|i| i.value().as_str()), Some("de"));
}

/// Test PHP key mangling of dots and spaces
#[test]
fn test_query_key_mangling() {
    let input = InputHandler::decode(get("/?user.name=bob&first+name=al"), &InputConfig::default());

    assert_eq!(input.get("user_name").value().as_str(), Some("bob"));
    assert_eq!(input.get("first_name").value().as_str(), Some("al"));
}

/// Test url-encoded POST body
#[test]
fn test_form_body() {
    let input = InputHandler::decode(
        form("/signup?ref=ad", "email=A%40B.example&tags[]=x&tags[]=y"),
        &InputConfig::default(),
    );

    assert_eq!(input.data("email").value().as_str(), Some("A@B.example"));
    assert_eq!(input.value("tags", Value::Null, "post"), json!({"0": "x", "1": "y"}));
    assert_eq!(input.original_post().get("email"), Some(&RawValue::from("A@B.example")));
    assert_eq!(input.original_params().get("ref"), Some(&RawValue::from("ad")));
}

/// Test JSON body for body-bearing methods
#[test]
fn test_json_body_methods() {
    for method in ["POST", "PUT", "PATCH", "DELETE"] {
        let input = InputHandler::decode(
            json(method, "/items/1", r#"{"x": 5, "tags": ["a", "b"]}"#),
            &InputConfig::default(),
        );

        assert_eq!(input.data("x").value(), &InputValue::from(5i64), "method {}", method);
        assert_eq!(input.value("tags", Value::Null, method), json!({"0": "a", "1": "b"}));
    }
}

/// Test malformed JSON leaves body data empty
#[test]
fn test_malformed_json_body() {
    let input = InputHandler::decode(json("POST", "/", "{x:}"), &InputConfig::default());

    assert!(input.data("x").value().is_null());
    assert!(input.all(Filter::All).is_empty());
    assert_eq!(input.original_body_plain(), "{x:}");
}

/// Test JSON content type with +json suffix
#[test]
fn test_vendor_json_content_type() {
    let req = request(
        "POST",
        "/",
        Some("application/vnd.api+json; charset=utf-8"),
        r#"{"id": "7"}"#.to_string(),
    );
    let input = InputHandler::decode(req, &InputConfig::default());

    assert_eq!(input.data("id").value().as_str(), Some("7"));
}

/// Test body over post_max_size is not decoded
#[test]
fn test_post_max_size() {
    let config = InputConfig {
        post_max_size: 8,
        ..InputConfig::default()
    };
    let input = InputHandler::decode(form("/", "name=a-rather-long-value"), &config);

    assert!(input.data("name").value().is_null());
    assert_eq!(input.original_body_plain(), "name=a-rather-long-value");
}

/// Test value/exists semantics for absent values
#[test]
fn test_value_defaults() {
    let input = InputHandler::decode(get("/?empty=&space=+&zero=0&list[]="), &InputConfig::default());

    assert_eq!(input.value("empty", "d", SourceFilter::any()), json!("d"));
    assert_eq!(input.value("space", "d", SourceFilter::any()), json!("d"));
    assert_eq!(input.value("zero", "d", SourceFilter::any()), json!("0"));
    assert_eq!(input.value("missing", 10, SourceFilter::any()), json!(10));

    assert!(!input.exists("empty", SourceFilter::any()));
    assert!(input.exists("zero", SourceFilter::any()));
    assert!(input.exists("list", SourceFilter::any()));
}

/// Test source precedence of all()
#[test]
fn test_all_precedence() {
    let input = InputHandler::decode(form("/?id=1&page=3", "id=2"), &InputConfig::default());

    let values = input.values(Filter::All);
    assert_eq!(values.get("id"), Some(&json!("2")));
    assert_eq!(values.get("page"), Some(&json!("3")));

    // find() searches the query first
    assert_eq!(input.find("id", SourceFilter::any()).to_json(), json!("1"));
}

/// Test explicit methods: the last named source decides
#[test]
fn test_find_explicit_methods() {
    let input = InputHandler::decode(form("/?id=query&qonly=q", "id=body"), &InputConfig::default());

    assert_eq!(input.find("id", ["get", "post"]).to_json(), json!("body"));
    assert_eq!(input.value("id", Value::Null, ["get", "post"]), json!("body"));
    assert!(input.find("qonly", ["get", "post"]).is_null());
    assert_eq!(input.value("qonly", "fallback", ["get", "post"]), json!("fallback"));
    assert_eq!(input.value("qonly", Value::Null, "get"), json!("q"));
}

/// Test deeply nested names are dropped instead of overflowing
#[test]
fn test_nesting_limit() {
    let body = format!("a{}=1&ok[x]=2", "[x]".repeat(200_000));
    let input = InputHandler::decode(form("/", &body), &InputConfig::default());

    assert!(input.data("a").value().is_null());
    assert_eq!(input.value("ok", Value::Null, "post"), json!({"x": "2"}));

    let config = InputConfig::default().with_input_limits(1000, 2);
    let input = InputHandler::decode(get("/?a[1][2]=x&b[1][2][3]=y"), &config);
    assert!(input.exists("a", "get"));
    assert!(!input.exists("b", "get"));
}

/// Test max_input_vars caps each source
#[test]
fn test_input_vars_limit() {
    let body = vec!["a[]=1"; 50_000].join("&");
    let input = InputHandler::decode(form("/?q=1", &body), &InputConfig::default());

    assert_eq!(input.data("a").value().as_items().map(|items| items.len()), Some(1000));
    assert_eq!(input.value("q", Value::Null, "get"), json!("1"));

    let config = InputConfig::default().with_input_limits(2, 64);
    let input = InputHandler::decode(get("/?a=1&b=2&c=3"), &config);
    let names: Vec<String> = input.values(Filter::All).keys().map(str::to_string).collect();
    assert_eq!(names, vec!["a", "b"]);
}

/// Test serde serialization of the input tree
#[test]
fn test_serialize_items() {
    let input = InputHandler::decode(get("/?a[b]=1&c=2"), &InputConfig::default());

    let all = input.all(Filter::All);
    let encoded = serde_json::to_value(&all).unwrap();
    assert_eq!(encoded, json!({"a": {"b": "1"}, "c": "2"}));
}
