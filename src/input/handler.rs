//! Request input handler.
//!
//! Parses the query string, body fields and uploaded files of one request
//! into item/file trees and resolves lookups across them.

use std::borrow::Cow;

use serde_json::Value;

use super::file::{FileList, InputFile};
use super::filter::{Filter, SourceFilter};
use super::item::{InputItem, InputValue, ItemList};
use super::node::{is_absent, InputNode};
use super::parser::parse_input_items;
use super::rearrange::parse_files;
use super::validation::{AttributeSource, FromRules, InputValidator};
use crate::config::InputConfig;
use crate::core::{ContentKind, Request, Result};
use crate::superglobals::Superglobals;
use crate::types::{KeyedList, RawArray, RawValue};

/// Nodes resolved by [`InputHandler::all`], keyed by field name.
pub type NodeList = KeyedList<InputNode>;

// =============================================================================
// Parsed snapshot
// =============================================================================

/// Result of one full parse of a request's inputs.
#[derive(Debug, Clone, Default)]
pub struct ParsedInputs {
    pub get: ItemList,
    pub data: ItemList,
    pub file: FileList,
    pub original_params: RawArray,
    pub original_post: RawArray,
    pub original_body: RawArray,
    pub original_body_plain: String,
    pub original_file: RawArray,
}

impl ParsedInputs {
    /// Parse every source of `request` from its superglobals.
    pub fn parse(request: &Request, globals: &Superglobals) -> Self {
        let mut parsed = Self {
            original_body_plain: String::from_utf8_lossy(&globals.body).into_owned(),
            ..Self::default()
        };

        if !globals.get.is_empty() {
            parsed.original_params = globals.get.clone();
            parsed.get = parse_input_items(&globals.get);
        }

        if request.has_body_method() {
            if request.content_kind() == ContentKind::Json {
                parsed.parse_json_body(&globals.body);
            } else if !globals.post.is_empty() {
                parsed.original_post = globals.post.clone();
                parsed.data = parse_input_items(&globals.post);
            }
        }

        if !globals.files.is_empty() {
            parsed.original_file = globals.files.clone();
            parsed.file = parse_files(&globals.files, None);
        }

        tracing::debug!(
            method = %request.method(),
            get = parsed.get.len(),
            data = parsed.data.len(),
            file = parsed.file.len(),
            "input_handler: parsed inputs"
        );

        parsed
    }

    fn parse_json_body(&mut self, body: &[u8]) {
        let value = match serde_json::from_slice::<Value>(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, body_len = body.len(), "input_handler: invalid JSON body ignored");
                return;
            }
        };

        match RawValue::from(value) {
            RawValue::Array(array) => {
                self.data = parse_input_items(&array);
                self.original_body = array;
            }
            RawValue::Scalar(_) => {
                tracing::debug!("input_handler: JSON body is not an object or array, ignored");
            }
        }
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Inputs of one request, parsed once and queried by name.
///
/// Precedence across sources is body data, then query, then files.
///
/// ```rust,ignore
/// let input = InputHandler::from_request(request, &config.input).await?;
/// let page = input.value("page", 1, SourceFilter::from("get"));
/// let avatar = input.file("avatar");
/// ```
#[derive(Debug)]
pub struct InputHandler {
    request: Request,
    globals: Superglobals,
    inputs: ParsedInputs,
}

impl InputHandler {
    /// Create a handler over already decoded superglobals.
    pub fn new(request: Request, globals: Superglobals) -> Self {
        let inputs = ParsedInputs::parse(&request, &globals);
        Self {
            request,
            globals,
            inputs,
        }
    }

    /// Create a handler, decoding the query and url-encoded body.
    ///
    /// Multipart bodies are not decoded; use [`InputHandler::from_request`].
    pub fn decode(request: Request, config: &InputConfig) -> Self {
        let globals = Superglobals::decode(&request, config);
        Self::new(request, globals)
    }

    /// Create a handler, decoding every source including multipart uploads.
    #[cfg(feature = "multipart")]
    pub async fn from_request(request: Request, config: &InputConfig) -> Result<Self> {
        let globals = Superglobals::from_request(&request, config).await?;
        Ok(Self::new(request, globals))
    }

    /// Discard all parsed state (including injected nodes) and parse the
    /// superglobals again.
    pub fn parse_inputs(&mut self) -> &mut Self {
        self.inputs = ParsedInputs::parse(&self.request, &self.globals);
        self
    }

    #[inline]
    pub fn request(&self) -> &Request {
        &self.request
    }

    #[inline]
    pub fn superglobals(&self) -> &Superglobals {
        &self.globals
    }

    /// Current parsed snapshot.
    #[inline]
    pub fn inputs(&self) -> &ParsedInputs {
        &self.inputs
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Query item by name, or a null placeholder.
    pub fn get(&self, name: &str) -> Cow<'_, InputItem> {
        self.get_or(name, InputValue::default())
    }

    /// Query item by name, or a placeholder holding `default`.
    pub fn get_or(&self, name: &str, default: impl Into<InputValue>) -> Cow<'_, InputItem> {
        lookup_item(&self.inputs.get, name, default)
    }

    /// Body item by name, or a null placeholder.
    pub fn data(&self, name: &str) -> Cow<'_, InputItem> {
        self.data_or(name, InputValue::default())
    }

    /// Body item by name, or a placeholder holding `default`.
    pub fn data_or(&self, name: &str, default: impl Into<InputValue>) -> Cow<'_, InputItem> {
        lookup_item(&self.inputs.data, name, default)
    }

    /// Uploaded file by field name, or a null placeholder.
    pub fn file(&self, name: &str) -> Cow<'_, InputFile> {
        match self.inputs.file.get(name) {
            Some(file) => Cow::Borrowed(file),
            None => Cow::Owned(InputFile::new(name)),
        }
    }

    /// Resolve `name` across the sources selected by `methods`.
    ///
    /// With no methods, sources are tried in query, body, file order and a
    /// later source is only consulted while the result is still null.
    /// Explicit methods consult every named source in that order and the
    /// last one named wins, even when it holds nothing: `["get", "post"]`
    /// for a name that only exists in the query resolves to null.
    /// Nothing found yields a null item.
    pub fn find(&self, name: &str, methods: impl Into<SourceFilter>) -> InputNode {
        let methods = methods.into();
        let fallthrough = methods.is_empty();
        let mut found: Option<InputNode> = None;

        if methods.includes_query() {
            found = self.inputs.get.get(name).cloned().map(InputNode::Item);
        }

        if (fallthrough && is_unresolved(&found)) || methods.names_body() {
            found = self.inputs.data.get(name).cloned().map(InputNode::Item);
        }

        if (fallthrough && is_unresolved(&found)) || methods.names_file() {
            found = self
                .inputs
                .file
                .get(name)
                .filter(|file| !file.is_null())
                .cloned()
                .map(InputNode::File);
        }

        found.unwrap_or_else(|| InputItem::placeholder(name).into())
    }

    /// Value of `name`, or `default` when it is absent (null, empty
    /// container or blank string).
    pub fn value(
        &self,
        name: &str,
        default: impl Into<Value>,
        methods: impl Into<SourceFilter>,
    ) -> Value {
        let value = self.find(name, methods).to_json();
        if is_absent(&value) {
            default.into()
        } else {
            value
        }
    }

    /// Whether `name` holds a non-absent value. `""` does not exist; `"0"` does.
    pub fn exists(&self, name: &str, methods: impl Into<SourceFilter>) -> bool {
        !self.value(name, Value::Null, methods).is_null()
    }

    /// Nodes of every source merged by name.
    ///
    /// Body data wins over query items, which win over files. A name or typed
    /// filter restricts the result to the requested fields, in filter order,
    /// synthesizing null placeholders for missing ones.
    ///
    /// Typed rules coerce clones of the stored nodes. Unlike PHP's
    /// `all()`, which coerces the stored items in place, later lookups on
    /// this handler still see the uncoerced values:
    ///
    /// ```rust,ignore
    /// input.all([("age", Some("int"))]);  // "42" -> 42 in the result
    /// input.value("age", Value::Null, "post");  // still "42"
    /// ```
    pub fn all(&self, filter: impl Into<Filter>) -> NodeList {
        let merged = self.merged();
        let filter = filter.into();

        let Some(entries) = filter.entries() else {
            return merged;
        };

        let mut output = NodeList::with_capacity(entries.len());
        for (name, rule) in entries {
            let mut node = merged
                .get(name)
                .cloned()
                .unwrap_or_else(|| InputItem::placeholder(name).into());

            if let Some(rule) = rule {
                node.coerce(rule);
            }
            output.insert(name, node);
        }

        output
    }

    /// Values of [`InputHandler::all`], keyed by field name.
    pub fn values(&self, filter: impl Into<Filter>) -> KeyedList<Value> {
        self.all(filter)
            .into_iter()
            .map(|(name, node)| (name, node.to_json()))
            .collect()
    }

    fn merged(&self) -> NodeList {
        let mut merged = NodeList::with_capacity(
            self.inputs.data.len() + self.inputs.get.len() + self.inputs.file.len(),
        );

        for (name, item) in self.inputs.data.iter() {
            merged.insert(name, item.clone().into());
        }
        for (name, item) in self.inputs.get.iter() {
            if !merged.contains_key(name) {
                merged.push(name, item.clone().into());
            }
        }
        for (name, file) in self.inputs.file.iter() {
            if !merged.contains_key(name) {
                merged.push(name, file.clone().into());
            }
        }

        merged
    }

    // -------------------------------------------------------------------------
    // Injection
    // -------------------------------------------------------------------------

    /// Add or replace a query item.
    pub fn add_get(&mut self, name: impl Into<String>, item: InputItem) -> &mut Self {
        self.inputs.get.insert(name, item);
        self
    }

    /// Add or replace a body item.
    pub fn add_data(&mut self, name: impl Into<String>, item: InputItem) -> &mut Self {
        self.inputs.data.insert(name, item);
        self
    }

    /// Add or replace an uploaded file.
    pub fn add_file(&mut self, name: impl Into<String>, file: InputFile) -> &mut Self {
        self.inputs.file.insert(name, file);
        self
    }

    // -------------------------------------------------------------------------
    // Raw snapshots
    // -------------------------------------------------------------------------

    /// `$_GET` as seen by the last parse.
    pub fn original_params(&self) -> &RawArray {
        &self.inputs.original_params
    }

    /// `$_POST` as seen by the last parse (empty for JSON bodies).
    pub fn original_post(&self) -> &RawArray {
        &self.inputs.original_post
    }

    /// Decoded JSON body.
    pub fn original_body(&self) -> &RawArray {
        &self.inputs.original_body
    }

    /// Raw request body as text.
    pub fn original_body_plain(&self) -> &str {
        &self.inputs.original_body_plain
    }

    /// `$_FILES` as seen by the last parse.
    pub fn original_file(&self) -> &RawArray {
        &self.inputs.original_file
    }

    pub fn set_original_params(&mut self, params: RawArray) -> &mut Self {
        self.inputs.original_params = params;
        self
    }

    pub fn set_original_post(&mut self, post: RawArray) -> &mut Self {
        self.inputs.original_post = post;
        self
    }

    pub fn set_original_file(&mut self, file: RawArray) -> &mut Self {
        self.inputs.original_file = file;
        self
    }

    // -------------------------------------------------------------------------
    // Declared validations
    // -------------------------------------------------------------------------

    /// Nodes for the fields declared by `source`, coerced to their types.
    pub fn require_attributes<A>(&self, source: &A) -> NodeList
    where
        A: AttributeSource + ?Sized,
    {
        self.all(attribute_filter(source))
    }

    /// Values for the fields declared by `source`, coerced to their types.
    pub fn require_attribute_values<A>(&self, source: &A) -> KeyedList<Value>
    where
        A: AttributeSource + ?Sized,
    {
        self.values(attribute_filter(source))
    }

    /// Run `validator` over this handler, building one from the rules
    /// declared by `source` when none is given.
    pub fn validate_attributes<A, V>(&self, source: &A, validator: Option<V>) -> Result<V>
    where
        A: AttributeSource + ?Sized,
        V: InputValidator + FromRules,
    {
        let mut validator = match validator {
            Some(validator) => validator,
            None => V::from_rules(
                source
                    .declared_validations()
                    .into_iter()
                    .map(|attr| (attr.name, attr.full_validator))
                    .collect(),
            ),
        };

        validator.validate_inputs(self)?;
        Ok(validator)
    }
}

fn lookup_item<'a>(
    items: &'a ItemList,
    name: &str,
    default: impl Into<InputValue>,
) -> Cow<'a, InputItem> {
    match items.get(name) {
        Some(item) => Cow::Borrowed(item),
        None => Cow::Owned(InputItem::new(name, default)),
    }
}

fn is_unresolved(node: &Option<InputNode>) -> bool {
    node.as_ref().map_or(true, InputNode::is_null)
}

fn attribute_filter<A>(source: &A) -> Filter
where
    A: AttributeSource + ?Sized,
{
    Filter::Typed(
        source
            .declared_validations()
            .into_iter()
            .map(|attr| (attr.name, attr.kind))
            .collect(),
    )
}
