//! Parameter flattening and form encoding for API requests.
//!
//! The Monarc API accepts arbitrarily nested parameter trees, flattened
//! on the wire into `parent[child]` / `parent[]` key paths and sent
//! either as a query string (GET/DELETE) or as an
//! `application/x-www-form-urlencoded` body (POST). [`encode`] performs
//! the flattening; [`query_string`] renders the flat pairs with percent
//! encoding.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// A top-level parameter tree, keyed by root parameter name.
///
/// `BTreeMap` keeps encoding output deterministic; the server treats the
/// key set as unordered.
pub type Params = BTreeMap<String, ParamValue>;

/// A nested parameter value accepted by the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Omitted entirely when encoding, not sent as an empty string.
    Null,
    /// Encoded as `true` / `false`.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value; non-ASCII text is percent-encoded as UTF-8 bytes.
    String(String),
    /// Encoded as integer Unix seconds of the instant, normalized using
    /// the value's own offset.
    DateTime(DateTime<FixedOffset>),
    /// Encoded as one `key[]` pair per element, preserving input order.
    List(Vec<ParamValue>),
    /// Encoded recursively as `key[child]` pairs.
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Wraps an offset-less timestamp, interpreting it as UTC.
    ///
    /// The API wire format carries instants, so an offset is required to
    /// encode one; values without an offset default to UTC rather than
    /// the local system zone.
    #[must_use]
    pub fn from_naive_utc(naive: NaiveDateTime) -> Self {
        Self::DateTime(naive.and_utc().fixed_offset())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<FixedOffset>> for ParamValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

impl<T: Into<Self>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<Option<ParamValue>> for ParamValue {
    fn from(value: Option<Self>) -> Self {
        value.unwrap_or(Self::Null)
    }
}

/// Flattens `value` under `root_key` into ordered `(key_path, value)`
/// pairs.
///
/// `Null` produces no pairs. Scalars produce one pair. Sequences repeat
/// `root_key[]` once per element in input order; mappings recurse as
/// `root_key[child]`. Recursion depth is unbounded.
#[must_use]
pub fn encode(root_key: &str, value: &ParamValue) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    encode_into(root_key, value, &mut pairs);
    pairs
}

/// Flattens a whole parameter tree, one root key at a time.
#[must_use]
pub fn encode_params(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        encode_into(key, value, &mut pairs);
    }
    pairs
}

fn encode_into(key: &str, value: &ParamValue, out: &mut Vec<(String, String)>) {
    match value {
        ParamValue::Null => {}
        ParamValue::Bool(b) => out.push((key.to_owned(), b.to_string())),
        ParamValue::Int(n) => out.push((key.to_owned(), n.to_string())),
        ParamValue::Float(x) => out.push((key.to_owned(), x.to_string())),
        ParamValue::String(s) => out.push((key.to_owned(), s.clone())),
        ParamValue::DateTime(dt) => out.push((key.to_owned(), dt.timestamp().to_string())),
        ParamValue::List(items) => {
            let item_key = format!("{key}[]");
            for item in items {
                encode_into(&item_key, item, out);
            }
        }
        ParamValue::Map(entries) => {
            for (child, item) in entries {
                encode_into(&format!("{key}[{child}]"), item, out);
            }
        }
    }
}

/// Renders flat pairs as an `application/x-www-form-urlencoded` string,
/// percent-encoding both keys and values.
///
/// The same rendering serves as query string (GET/DELETE) and form body
/// (POST).
#[must_use]
pub fn query_string(pairs: &[(String, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
