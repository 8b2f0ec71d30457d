//! Canonical query-string encoding used as the signing input of URL flows
//! (payment URL, return URL, IPN).
//!
//! Null values are dropped, keys are sorted by byte value and values are
//! `application/x-www-form-urlencoded` (space becomes `+`). The output must be
//! byte-stable for a given field set: it is what the HMAC is computed over.

use std::collections::BTreeMap;

use serde_json::{Number, Value as JsonValue};
use url::form_urlencoded::byte_serialize;
use vnpay_types::FieldMap;

/// Sorted, stringified parameters; `BTreeMap<String, _>` orders keys by bytes
pub type SignedParameterSet = BTreeMap<String, String>;

/// Stringify one field value. `None` means the field is omitted.
pub fn stringify(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(number_to_string(n)),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// Plain digits only: no exponent, no separators, no trailing ".0"
fn number_to_string(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Drop nulls, stringify and sort
pub fn to_parameter_set(fields: &FieldMap) -> SignedParameterSet {
    fields
        .iter()
        .filter_map(|(k, v)| stringify(v).map(|s| (k.clone(), s)))
        .collect()
}

/// Encode an already sorted set as `k=v&k=v`
pub fn encode_parameter_set(params: &SignedParameterSet) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical signing string for a field map
pub fn encode(fields: &FieldMap) -> String {
    encode_parameter_set(&to_parameter_set(fields))
}

fn form_encode(input: &str) -> String {
    byte_serialize(input.as_bytes()).collect()
}
