//! Value serialization
//!
//! Two wire forms: canonical JEL source text (the `Display` form, which
//! parses back through the native constructor registry) and JSON.

pub mod json;

use crate::value::Value;

/// Canonical source text for a value; `parse` + evaluation reproduces an
/// equal value
pub fn to_source(value: &Value) -> String {
    value.to_string()
}
