//! Raw parameter mapping
//!
//! Turns the flat `key → string` pairs of a request into a
//! [`StructuredQuery`]. Per value:
//! - trim, then strip one pair of surrounding double quotes
//! - bracketed (`[...]`) values decode as arrays; outside the exception keys
//!   bare tokens are quoted first, so `[Delhi,Mumbai]` becomes two strings
//! - `offset`, `limit`, `maxDistance` and scalar `coordinates` coerce to
//!   integers by truncation
//! - `q` must match the free-text grammar
//!
//! The first bad parameter aborts the whole request.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MappingError, MappingResult};
use crate::facets::classify;
use crate::query::{StructuredQuery, keys};
use crate::tokenizer::quote_bare_tokens;
use crate::value::ParamValue;

/// Free text: optional leading `*`, letters/digits/`-`/`_`/space, optional trailing `*`
static TEXT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*?[A-Za-z0-9\-_ ]+\*?$").expect("text pattern regex"));

/// Map every parameter, then classify the result.
pub fn map_params<I, K, V>(params: I) -> MappingResult<StructuredQuery>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut query = assemble(params)?;
    classify(&mut query);
    Ok(query)
}

/// Map every parameter into a structured query without classifying it.
pub fn assemble<I, K, V>(params: I) -> MappingResult<StructuredQuery>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut query = StructuredQuery::new();
    for (key, raw) in params {
        let key = key.as_ref();
        let value = map_param(key, raw.as_ref()).inspect_err(|err| {
            tracing::debug!(key, error_type = err.error_type(), "rejected query parameter");
        })?;
        query.insert(key, value);
    }
    tracing::debug!(params = query.len(), "query parameters mapped");
    Ok(query)
}

/// Map a single parameter.
pub fn map_param(key: &str, raw: &str) -> MappingResult<ParamValue> {
    let value = unquote(raw.trim());
    if value.is_empty() {
        return Err(MappingError::EmptyValue { key: key.into() });
    }

    if is_bracketed(value) {
        return map_array(key, value);
    }

    if !keys::is_exception(key) {
        return Ok(ParamValue::Scalar(value.to_string()));
    }
    if key == keys::Q {
        if !TEXT_PATTERN.is_match(value) {
            return Err(MappingError::InvalidText { key: key.into() });
        }
        return Ok(ParamValue::Scalar(value.to_string()));
    }
    coerce_integer(key, value).map(ParamValue::Integer)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn is_bracketed(value: &str) -> bool {
    value.starts_with('[') && value.ends_with(']')
}

fn map_array(key: &str, value: &str) -> MappingResult<ParamValue> {
    let source = if keys::is_exception(key) {
        std::borrow::Cow::Borrowed(value)
    } else {
        quote_bare_tokens(value)
    };
    let decoded: serde_json::Value =
        serde_json::from_str(&source).map_err(|err| MappingError::MalformedArray {
            key: key.into(),
            source: err,
        })?;
    ParamValue::from_json(decoded)
        .ok_or_else(|| MappingError::UnsupportedElement { key: key.into() })
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_integer(key: &str, value: &str) -> MappingResult<i64> {
    match value.parse::<f64>() {
        // `as` saturates at the i64 bounds
        Ok(n) if n.is_finite() => Ok(n.trunc() as i64),
        _ => Err(MappingError::NotANumber {
            key: key.into(),
            value: value.into(),
        }),
    }
}
