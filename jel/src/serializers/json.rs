//! JSON serialization
//!
//! Primitives map onto their JSON counterparts; a composite value becomes
//! `{"type": ..., "properties": [...]}` using its ordered serialization
//! properties, so the JSON form carries exactly the information needed to
//! reconstruct an equal instance.

use crate::value::Value;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Map, Number};

pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        // Decimals that survive the trip to f64 stay JSON numbers; the
        // rest fall back to their exact string form.
        Value::Number(n) => n
            .to_f64()
            .and_then(Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(n.to_string())),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect())
        }
        Value::Dictionary(entries) => {
            let mut object = Map::new();
            for (key, entry) in entries {
                object.insert(key.clone(), to_json(entry));
            }
            serde_json::Value::Object(object)
        }
        Value::Lambda(lambda) => json!({
            "type": "Lambda",
            "source": Value::Lambda(lambda.clone()).to_string(),
        }),
        composite => {
            let properties: Vec<serde_json::Value> = composite
                .serialization_properties()
                .iter()
                .map(to_json)
                .collect();
            json!({
                "type": composite.type_name(),
                "properties": properties,
            })
        }
    }
}

pub fn to_json_string(value: &Value) -> String {
    to_json(value).to_string()
}
