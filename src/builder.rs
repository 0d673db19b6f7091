//! Seed construction.
//!
//! [`build`] turns the seed of an expression into its first carrier. A seed
//! that is a bare identifier naming a stored value of the right type is
//! resumed from the store instead of being parsed as text, so a value kept
//! with `store(var)` comes back with its exact structure (decimal scale,
//! document layout, raw bytes).

use tracing::debug;

use crate::ast::TypeKeyword;
use crate::context::{EvalContext, StoredValue};
use crate::escape::EscapeCodec;
use crate::evaluator::EvalError;
use crate::value::{DataValue, ListValue, string_items};

/// Letters, digits, `_`, `.` and `-`, not starting with a digit.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Builds the carrier for `keyword` from `seed` (escapes still in place).
///
/// # Examples
///
/// ```
/// use typeflow::builder::build;
/// use typeflow::ast::TypeKeyword;
/// use typeflow::context::{Collaborators, EngineConfig, EvalContext, LiteralContent, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// let config = EngineConfig::default();
/// let collaborators = Collaborators::default();
/// let ctx = EvalContext {
///     store: &mut store,
///     config: &config,
///     resolver: &LiteralContent,
///     collaborators: &collaborators,
/// };
///
/// let value = build(TypeKeyword::Number, "2.50", &ctx).unwrap();
/// assert_eq!(value.stringify().as_deref(), Some("2.50"));
/// ```
pub fn build(keyword: TypeKeyword, seed: &str, ctx: &EvalContext<'_>) -> Result<DataValue, EvalError> {
    let name = seed.trim();
    if is_identifier(name)
        && let Some(stored) = ctx.store.get(name)
        && let Some(value) = resume(keyword, stored, ctx.delimiter())
    {
        debug!(%keyword, name, "Resumed stored value");
        return Ok(value);
    }

    // lists split on the delimiter themselves and need `\,` intact
    let text = if keyword == TypeKeyword::List {
        seed.to_string()
    } else {
        EscapeCodec::new(ctx.delimiter()).unescape(seed)
    };

    let conversion = |reason: String| EvalError::Conversion {
        keyword,
        value: seed.to_string(),
        reason,
    };

    let text = ctx.resolver.resolve(&text).map_err(conversion)?;
    DataValue::parse(keyword, &text, ctx).map_err(conversion)
}

/// Snapshot of a stored value usable as a `keyword` seed, if any.
fn resume(keyword: TypeKeyword, stored: &StoredValue, delimiter: char) -> Option<DataValue> {
    match stored {
        StoredValue::Data(value) if value.keyword() == keyword => Some(value.snapshot()),
        StoredValue::Data(DataValue::Json(json)) if keyword == TypeKeyword::List => {
            string_items(json.value()).map(|items| DataValue::List(ListValue::new(items, delimiter)))
        }
        StoredValue::Array(items) if keyword == TypeKeyword::List => {
            Some(DataValue::List(ListValue::new(items.clone(), delimiter)))
        }
        _ => None,
    }
}
