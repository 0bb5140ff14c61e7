//! Source and field filters for handler lookups.

use std::collections::HashMap;

/// Body-bearing methods whose data lives in the body source.
const BODY_TAGS: [&str; 4] = ["post", "put", "patch", "delete"];

/// Source tags restricting a lookup: `get`, `post`, `put`, `patch`,
/// `delete`, `file`.
///
/// Tags are matched case-insensitively. An empty filter searches every
/// source; unknown tags match nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter(Vec<String>);

impl SourceFilter {
    /// Filter matching every source.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tags.into_iter()
                .map(|t| t.as_ref().trim().to_ascii_lowercase())
                .collect(),
        )
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the query source is searched.
    pub fn includes_query(&self) -> bool {
        self.is_empty() || self.has("get")
    }

    /// Whether the body source is searched.
    pub fn includes_body(&self) -> bool {
        self.is_empty() || self.names_body()
    }

    /// Whether the uploaded files are searched.
    pub fn includes_file(&self) -> bool {
        self.is_empty() || self.names_file()
    }

    /// Whether a body method is named explicitly.
    pub fn names_body(&self) -> bool {
        BODY_TAGS.iter().any(|tag| self.has(tag))
    }

    /// Whether `file` is named explicitly.
    pub fn names_file(&self) -> bool {
        self.has("file")
    }

    fn has(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }
}

impl From<&str> for SourceFilter {
    fn from(tag: &str) -> Self {
        Self::new([tag])
    }
}

impl<const N: usize> From<[&str; N]> for SourceFilter {
    fn from(tags: [&str; N]) -> Self {
        Self::new(tags)
    }
}

impl From<&[&str]> for SourceFilter {
    fn from(tags: &[&str]) -> Self {
        Self::new(tags)
    }
}

impl From<Vec<&str>> for SourceFilter {
    fn from(tags: Vec<&str>) -> Self {
        Self::new(tags)
    }
}

impl From<Vec<String>> for SourceFilter {
    fn from(tags: Vec<String>) -> Self {
        Self::new(tags)
    }
}

/// Field selection for [`InputHandler::all`](super::InputHandler::all).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    /// Every field from every source.
    #[default]
    All,
    /// Only the named fields; missing ones become placeholders.
    Names(Vec<String>),
    /// Named fields with an optional coercion rule each.
    Typed(Vec<(String, Option<String>)>),
}

impl Filter {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn typed<I, K, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<R>)>,
        K: Into<String>,
        R: Into<String>,
    {
        Filter::Typed(
            rules
                .into_iter()
                .map(|(name, rule)| (name.into(), rule.map(Into::into)))
                .collect(),
        )
    }

    /// Requested fields with their rules, in filter order. `None` for
    /// [`Filter::All`].
    pub fn entries(&self) -> Option<Vec<(&str, Option<&str>)>> {
        match self {
            Filter::All => None,
            Filter::Names(names) => Some(names.iter().map(|n| (n.as_str(), None)).collect()),
            Filter::Typed(rules) => Some(
                rules
                    .iter()
                    .map(|(n, r)| (n.as_str(), r.as_deref()))
                    .collect(),
            ),
        }
    }
}

impl<const N: usize> From<[&str; N]> for Filter {
    fn from(names: [&str; N]) -> Self {
        Filter::names(names)
    }
}

impl From<Vec<String>> for Filter {
    fn from(names: Vec<String>) -> Self {
        Filter::Names(names)
    }
}

impl From<Vec<(String, Option<String>)>> for Filter {
    fn from(rules: Vec<(String, Option<String>)>) -> Self {
        Filter::Typed(rules)
    }
}

impl<const N: usize> From<[(&str, Option<&str>); N]> for Filter {
    fn from(rules: [(&str, Option<&str>); N]) -> Self {
        Filter::typed(rules)
    }
}

/// Unordered rule maps are accepted; fields are then visited in key order.
impl From<HashMap<String, Option<String>>> for Filter {
    fn from(rules: HashMap<String, Option<String>>) -> Self {
        let mut rules: Vec<_> = rules.into_iter().collect();
        rules.sort_by(|a, b| a.0.cmp(&b.0));
        Filter::Typed(rules)
    }
}
