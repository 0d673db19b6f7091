use std::sync::LazyLock;

use serde_json::Value;
use tracing::debug;

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::path;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::json::{carrier_for, path_arg};
use crate::value::{DataType, DataValue, JsonValue, NumberValue, TextValue};

/// Result handed back by a host collaborator for a `SQL`, `EXCEL` or `WEB`
/// seed.
///
/// A failure on the collaborator's side does not abort the pipeline; it
/// lands in [`error`](Self::error) and the chain can inspect it with
/// `error()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalValue {
    keyword: TypeKeyword,
    data: Value,
    error: Option<String>,
}

impl ExternalValue {
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl DataType for ExternalValue {
    fn parse(keyword: TypeKeyword, text: &str, ctx: &EvalContext<'_>) -> Result<Self, String> {
        let collaborator = ctx
            .collaborators
            .get(keyword)
            .ok_or_else(|| format!("No collaborator registered for {}", keyword))?;

        debug!(%keyword, "Fetching external value");
        let payload = collaborator.fetch(keyword, text)?;
        Ok(ExternalValue {
            keyword,
            data: payload.data,
            error: payload.error,
        })
    }

    /// Strings print bare and containers as compact JSON. A result without
    /// data prints its error, if any.
    fn stringify(&self) -> Option<String> {
        match &self.data {
            Value::Null => self.error.clone(),
            Value::String(s) => Some(s.clone()),
            other => serde_json::to_string(other).ok(),
        }
    }

    fn keyword(&self) -> TypeKeyword {
        self.keyword
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::External(self)
    }
}

static REGISTRY: LazyLock<Registry<ExternalValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Sql, OPERATIONS));

const OPERATIONS: &[OpSpec<ExternalValue>] = &[
    OpSpec::fixed("error", 0, error),
    OpSpec::fixed("extract", 1, extract),
    OpSpec::fixed("size", 0, size),
    OpSpec::fixed("json", 0, json),
];

/// The collaborator's error message, empty when the call succeeded.
fn error(external: ExternalValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let message = external.error.unwrap_or_default();
    Ok(Some(TextValue::new(message).into_data()))
}

fn extract(external: ExternalValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let path = path_arg(args, 0, "extract")?;
    Ok(path::lookup(&external.data, &path).and_then(|found| carrier_for(found, false)))
}

/// Row count for tabular results, entry count for objects.
fn size(external: ExternalValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let size = match &external.data {
        Value::Array(rows) => rows.len(),
        Value::Object(map) => map.len(),
        Value::Null => 0,
        _ => 1,
    };
    Ok(Some(NumberValue::from(size as i64).into_data()))
}

fn json(external: ExternalValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(JsonValue::new(external.data).into_data()))
}
