//! Request input trees.
//!
//! - [`InputItem`] - named scalar or nested value from the query or body
//! - [`InputFile`] - uploaded file, or a container of nested uploads
//! - [`parse_input_items`] - platform array to item tree
//! - [`parse_files`] - `$_FILES` column layout to file tree
//! - [`InputHandler`] - per-request lookups across all sources

mod file;
mod filter;
mod handler;
mod item;
mod node;
mod parser;
mod rearrange;
mod validation;
mod value_parser;

pub use file::{FileList, FileValue, InputFile};
pub use filter::{Filter, SourceFilter};
pub use handler::{InputHandler, NodeList, ParsedInputs};
pub use item::{InputItem, InputValue, ItemList};
pub use node::{is_absent, InputNode};
pub use parser::parse_input_items;
pub use rearrange::parse_files;
pub use validation::{AttributeSource, FromRules, InputValidator, ValidatorAttribute};
pub use value_parser::ValueParser;
