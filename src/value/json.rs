use std::sync::LazyLock;

use serde_json::Value;

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::evaluator::EvalError;
use crate::path::{self, Path};
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue, ListValue, NumberValue, TextValue};

/// Parsed JSON document. Object keys keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonValue {
    value: Value,
    pretty: bool,
}

impl JsonValue {
    pub fn new(value: Value) -> Self {
        JsonValue {
            value,
            pretty: false,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl DataType for JsonValue {
    fn parse(_keyword: TypeKeyword, text: &str, _ctx: &EvalContext<'_>) -> Result<Self, String> {
        serde_json::from_str(text.trim())
            .map(JsonValue::new)
            .map_err(|e| format!("Invalid JSON: {}", e))
    }

    fn stringify(&self) -> Option<String> {
        if self.value.is_null() {
            return None;
        }
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&self.value)
        } else {
            serde_json::to_string(&self.value)
        };
        rendered.ok()
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Json
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Json(self)
    }
}

/// Carrier for a value pulled out of a document: strings and booleans
/// continue as text, numbers as numbers, containers as JSON. `null` has no
/// carrier.
pub(crate) fn carrier_for(value: &Value, pretty: bool) -> Option<DataValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(TextValue::new(s.clone()).into_data()),
        Value::Bool(b) => Some(TextValue::new(b.to_string()).into_data()),
        Value::Number(n) => {
            let text = n.to_string();
            Some(match NumberValue::parse_decimal(&text) {
                Ok(decimal) => NumberValue::new(decimal).into_data(),
                Err(_) => TextValue::new(text).into_data(),
            })
        }
        Value::Array(_) | Value::Object(_) => Some(
            JsonValue {
                value: value.clone(),
                pretty,
            }
            .into_data(),
        ),
    }
}

/// Items of an array as text. Scalars lose their quotes; nested containers
/// render as compact JSON.
pub(crate) fn string_items(value: &Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };
    Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
    )
}

pub(crate) fn path_arg(args: &Args, index: usize, function: &str) -> Result<Path, EvalError> {
    path::parse_path(args.get_or(index, "")).map_err(|reason| EvalError::InvalidArgument {
        function: function.to_string(),
        reason,
    })
}

static REGISTRY: LazyLock<Registry<JsonValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Json, OPERATIONS));

const OPERATIONS: &[OpSpec<JsonValue>] = &[
    OpSpec::fixed("extract", 1, extract),
    OpSpec::fixed("keys", 1, keys),
    OpSpec::fixed("count", 1, count),
    OpSpec::fixed("list", 1, list),
    OpSpec::fixed("replace", 2, replace),
    OpSpec::fixed("remove", 1, remove),
    OpSpec::fixed("compact", 0, compact),
    OpSpec::fixed("beautify", 0, beautify),
];

/// Value at `path`; ends the chain when the path is missing or `null`.
fn extract(json: JsonValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let path = path_arg(args, 0, "extract")?;
    Ok(path::lookup(&json.value, &path).and_then(|found| carrier_for(found, json.pretty)))
}

fn keys(json: JsonValue, args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    let path = path_arg(args, 0, "keys")?;
    let keys = match path::lookup(&json.value, &path) {
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    Ok(Some(ListValue::new(keys, ctx.delimiter()).into_data()))
}

/// Element count of the array or object at `path`, 0 when absent.
fn count(json: JsonValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let path = path_arg(args, 0, "count")?;
    let size = match path::lookup(&json.value, &path) {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        Some(Value::Null) | None => 0,
        Some(_) => 1,
    };
    Ok(Some(NumberValue::from(size as i64).into_data()))
}

fn list(json: JsonValue, args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    let path = path_arg(args, 0, "list")?;
    let items = path::lookup(&json.value, &path)
        .and_then(string_items)
        .unwrap_or_default();
    Ok(Some(ListValue::new(items, ctx.delimiter()).into_data()))
}

/// Writes `value` at `path`. The value is taken as JSON when it parses,
/// otherwise as a string.
fn replace(mut json: JsonValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let path = path_arg(args, 0, "replace")?;
    let raw = args.get_or(1, "null");
    let replacement =
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    path::assign(&mut json.value, &path, replacement).map_err(|reason| {
        EvalError::InvalidArgument {
            function: "replace".to_string(),
            reason,
        }
    })?;
    Ok(Some(json.into_data()))
}

fn remove(mut json: JsonValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let path = path_arg(args, 0, "remove")?;
    path::delete(&mut json.value, &path);
    Ok(Some(json.into_data()))
}

fn compact(mut json: JsonValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    json.pretty = false;
    Ok(Some(json.into_data()))
}

fn beautify(mut json: JsonValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    json.pretty = true;
    Ok(Some(json.into_data()))
}
