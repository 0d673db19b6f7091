//! Host variables -> named-value store conversion

use crate::context::StoredValue;
use crate::value::{DataValue, JsonValue, NumberValue, TextValue};

use super::CliError;

/// Convert a JSON value into what the store holds for it.
///
/// Strings and booleans become `TEXT` values, numbers `NUMBER` values.
/// Arrays of scalars become ordered collections, which `LIST(name)` can
/// resume. Anything else is kept as a `JSON` document.
pub fn json_to_stored(v: serde_json::Value) -> StoredValue {
    match v {
        serde_json::Value::String(s) => text(s),
        serde_json::Value::Bool(b) => text(b.to_string()),
        serde_json::Value::Number(n) => match NumberValue::parse_decimal(&n.to_string()) {
            Ok(decimal) => StoredValue::Data(DataValue::Number(NumberValue::new(decimal))),
            Err(_) => text(n.to_string()),
        },
        serde_json::Value::Array(items) if items.iter().all(is_scalar) => StoredValue::Array(
            items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        other => StoredValue::Data(DataValue::Json(JsonValue::new(other))),
    }
}

/// A `TEXT` value for the store.
pub fn text(value: impl Into<String>) -> StoredValue {
    StoredValue::Data(DataValue::Text(TextValue::new(value)))
}

fn is_scalar(v: &serde_json::Value) -> bool {
    !matches!(v, serde_json::Value::Array(_) | serde_json::Value::Object(_))
}

/// Split a `name=value` pair from the command line.
pub fn parse_var(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::InvalidVar(raw.to_string())),
    }
}

/// Read a JSON object of variables, in document order.
pub fn load_vars(json: &str) -> Result<Vec<(String, StoredValue)>, CliError> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    match parsed {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| (name, json_to_stored(value)))
            .collect()),
        _ => Err(CliError::InvalidVar(
            "variables file must hold a JSON object".to_string(),
        )),
    }
}
