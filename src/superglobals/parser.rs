//! Query string and form body decoding with PHP bracket semantics.

use std::borrow::Cow;

use crate::types::{ParamList, RawArray, RawValue};

/// Fast percent decode - returns Cow to avoid allocation when no decoding needed.
///
/// `+` is decoded to a space, as form encoding requires.
#[inline]
pub fn fast_percent_decode(s: &str) -> Cow<'_, str> {
    if !s.contains('%') && !s.contains('+') {
        return Cow::Borrowed(s);
    }

    let spaced = s.replace('+', " ");
    Cow::Owned(
        percent_encoding::percent_decode_str(&spaced)
            .decode_utf8_lossy()
            .into_owned(),
    )
}

/// Parse a query string into key-value pairs.
///
/// Keys are returned verbatim (brackets included); see [`build_array`].
pub fn parse_query_string(query: &str) -> ParamList {
    let pair_count = query.matches('&').count() + 1;
    let mut params = Vec::with_capacity(pair_count.min(16));

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.find('=') {
            Some(pos) => (&pair[..pos], &pair[pos + 1..]),
            None => (pair, ""),
        };

        if !key.is_empty() {
            params.push((
                fast_percent_decode(key).into_owned(),
                fast_percent_decode(value).into_owned(),
            ));
        }
    }

    params
}

/// Bounds applied while turning decoded pairs into nested arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of variables registered per source (`max_input_vars`).
    pub max_vars: usize,
    /// Maximum bracket depth of one variable name (`max_input_nesting_level`).
    pub max_depth: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_vars: 1000,
            max_depth: 64,
        }
    }
}

/// A variable name with more bracket segments than the allowed depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestingExceeded {
    /// Normalized base name of the rejected variable.
    pub base: String,
}

/// Split a PHP variable name into its base name and bracket segments.
///
/// `photos[group][]` becomes `("photos", [Some("group"), None])`, where
/// `None` stands for an auto-index `[]`. Returns `None` for names with an
/// empty base.
///
/// Follows PHP's registration rules: leading spaces are dropped, spaces and
/// dots in the base name become `_`, an unterminated first bracket is kept
/// literally (as `_`), and anything after the last well-formed segment is
/// ignored.
pub fn parse_key(name: &str) -> Option<(String, Vec<Option<String>>)> {
    parse_key_within(name, usize::MAX).unwrap_or(None)
}

/// [`parse_key`] with at most `max_depth` bracket segments.
///
/// Scanning stops at the first segment past the limit.
pub fn parse_key_within(
    name: &str,
    max_depth: usize,
) -> Result<Option<(String, Vec<Option<String>>)>, NestingExceeded> {
    let name = name.trim_start_matches(' ');

    let (base, mut rest) = match name.find('[') {
        Some(pos) if name[pos..].contains(']') => (&name[..pos], &name[pos..]),
        Some(pos) => {
            let literal = format!("{}_{}", &name[..pos], &name[pos + 1..]);
            return Ok(normalize_base(&literal).map(|base| (base, Vec::new())));
        }
        None => (name, ""),
    };

    let Some(base) = normalize_base(base) else {
        return Ok(None);
    };
    let mut segments = Vec::new();

    while let Some(inner) = rest.strip_prefix('[') {
        let Some(end) = inner.find(']') else {
            break;
        };
        if segments.len() == max_depth {
            return Err(NestingExceeded { base });
        }
        let segment = &inner[..end];
        segments.push(if segment.is_empty() {
            None
        } else {
            Some(segment.to_string())
        });
        rest = &inner[end + 1..];
    }

    Ok(Some((base, segments)))
}

fn normalize_base(base: &str) -> Option<String> {
    if base.is_empty() {
        return None;
    }
    Some(base.replace([' ', '.'], "_"))
}

/// Insert `value` into `array` along `segments`, creating nested arrays.
///
/// An existing scalar on the path is replaced by an array, and the last write
/// to a path wins, like PHP's `$array[a][b] = value`.
pub fn insert_path(array: &mut RawArray, segments: &[Option<String>], value: RawValue) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = array;
    for segment in parents {
        let key = match segment {
            Some(key) => key.clone(),
            None => current.next_index().to_string(),
        };
        if !matches!(current.get(&key), Some(RawValue::Array(_))) {
            current.insert(key.clone(), RawValue::Array(RawArray::new()));
        }
        current = match current.get_mut(&key) {
            Some(RawValue::Array(child)) => child,
            _ => return,
        };
    }

    let key = match last {
        Some(key) => key.clone(),
        None => current.next_index().to_string(),
    };
    current.insert(key, value);
}

/// Build a nested platform array from decoded `name=value` pairs.
///
/// Registration stops after `limits.max_vars` pairs. A name nested deeper
/// than `limits.max_depth` is rejected and its base variable is removed
/// altogether, as PHP does.
pub fn build_array<I, V>(pairs: I, limits: &DecodeLimits) -> RawArray
where
    I: IntoIterator<Item = (String, V)>,
    V: Into<RawValue>,
{
    let mut array = RawArray::new();

    for (count, (name, value)) in pairs.into_iter().enumerate() {
        if count >= limits.max_vars {
            tracing::debug!(
                max_input_vars = limits.max_vars,
                "parser: input variables exceed max_input_vars, ignoring the rest"
            );
            break;
        }

        let (base, segments) = match parse_key_within(&name, limits.max_depth) {
            Ok(Some(key)) => key,
            Ok(None) => {
                tracing::debug!(name = %name, "parser: skipping parameter with empty name");
                continue;
            }
            Err(NestingExceeded { base }) => {
                tracing::debug!(
                    base = %base,
                    max_input_nesting_level = limits.max_depth,
                    "parser: input variable nesting level exceeded, dropping variable"
                );
                array.remove(&base);
                continue;
            }
        };

        let mut path = Vec::with_capacity(segments.len() + 1);
        path.push(Some(base));
        path.extend(segments);
        insert_path(&mut array, &path, value.into());
    }

    array
}

/// Decode an `application/x-www-form-urlencoded` body or query string with
/// PHP's default limits.
#[inline]
pub fn parse_urlencoded(input: &str) -> RawArray {
    parse_urlencoded_with(input, &DecodeLimits::default())
}

/// Decode an `application/x-www-form-urlencoded` body or query string.
#[inline]
pub fn parse_urlencoded_with(input: &str, limits: &DecodeLimits) -> RawArray {
    build_array(parse_query_string(input), limits)
}
