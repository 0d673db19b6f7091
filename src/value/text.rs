use std::sync::LazyLock;

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::evaluator::EvalError;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue, ListValue, NumberValue};

/// Plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValue {
    value: String,
}

impl TextValue {
    pub fn new(value: impl Into<String>) -> Self {
        TextValue {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    fn with(mut self, value: String) -> OpResult {
        self.value = value;
        Ok(Some(self.into_data()))
    }
}

impl DataType for TextValue {
    fn parse(_keyword: TypeKeyword, text: &str, _ctx: &EvalContext<'_>) -> Result<Self, String> {
        Ok(TextValue::new(text))
    }

    fn stringify(&self) -> Option<String> {
        Some(self.value.clone())
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Text
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Text(self)
    }
}

static REGISTRY: LazyLock<Registry<TextValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Text, OPERATIONS));

const OPERATIONS: &[OpSpec<TextValue>] = &[
    OpSpec::fixed("upper", 0, upper),
    OpSpec::fixed("lower", 0, lower),
    OpSpec::fixed("title", 0, title),
    OpSpec::fixed("trim", 0, trim),
    OpSpec::fixed("pack", 0, pack),
    OpSpec::fixed("length", 0, length),
    OpSpec::variadic("append", 0, append),
    OpSpec::variadic("prepend", 0, prepend),
    OpSpec::fixed("replace", 2, replace),
    OpSpec::fixed("remove", 1, remove),
    OpSpec::fixed("removeStart", 1, remove_start),
    OpSpec::fixed("removeEnd", 1, remove_end),
    OpSpec::fixed("substring", 2, substring),
    OpSpec::fixed("before", 1, before),
    OpSpec::fixed("after", 1, after),
    OpSpec::fixed("between", 2, between),
    OpSpec::fixed("list", 1, list),
    OpSpec::fixed("number", 0, number),
    OpSpec::fixed("ascending", 0, ascending),
    OpSpec::fixed("descending", 0, descending),
    OpSpec::fixed("isEmpty", 0, is_empty),
];

fn upper(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let value = text.value.to_uppercase();
    text.with(value)
}

fn lower(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let value = text.value.to_lowercase();
    text.with(value)
}

/// Upper-cases the first letter of every word, lower-cases the rest.
fn title(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut result = String::with_capacity(text.value.len());
    let mut word_start = true;
    for ch in text.value.chars() {
        if ch.is_whitespace() {
            word_start = true;
            result.push(ch);
        } else if word_start {
            result.extend(ch.to_uppercase());
            word_start = false;
        } else {
            result.extend(ch.to_lowercase());
        }
    }
    text.with(result)
}

fn trim(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let value = text.value.trim().to_string();
    text.with(value)
}

/// Collapses whitespace runs into single spaces.
fn pack(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let value = text.value.split_whitespace().collect::<Vec<_>>().join(" ");
    text.with(value)
}

fn length(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(NumberValue::from(text.value.chars().count() as i64).into_data()))
}

fn append(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut value = text.value.clone();
    for part in args.rest() {
        value.push_str(part);
    }
    text.with(value)
}

fn prepend(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut value = args.rest().concat();
    value.push_str(&text.value);
    text.with(value)
}

fn replace(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let search = args.required(0, "replace")?;
    if search.is_empty() {
        return Ok(Some(text.into_data()));
    }
    let value = text.value.replace(search, args.get_or(1, ""));
    text.with(value)
}

fn remove(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    match args.get(0) {
        Some(search) if !search.is_empty() => {
            let value = text.value.replace(search, "");
            text.with(value)
        }
        _ => Ok(Some(text.into_data())),
    }
}

fn remove_start(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let prefix = args.get_or(0, "");
    let value = text.value.strip_prefix(prefix).unwrap_or(&text.value).to_string();
    text.with(value)
}

fn remove_end(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let suffix = args.get_or(0, "");
    let value = text.value.strip_suffix(suffix).unwrap_or(&text.value).to_string();
    text.with(value)
}

/// Character-based `[start, end)`; a missing end runs to the end of text.
fn substring(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let chars: Vec<char> = text.value.chars().collect();
    let len = chars.len() as i64;

    let start = args.int(0, "substring")?.unwrap_or(0).clamp(0, len) as usize;
    let end = args.int(1, "substring")?.unwrap_or(len).clamp(0, len) as usize;

    let value = if start >= end {
        String::new()
    } else {
        chars[start..end].iter().collect()
    };
    text.with(value)
}

/// Text before the first `separator`; the whole text when absent.
fn before(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let separator = args.get_or(0, "");
    if separator.is_empty() {
        return text.with(String::new());
    }
    let value = match text.value.find(separator) {
        Some(pos) => text.value[..pos].to_string(),
        None => text.value.clone(),
    };
    text.with(value)
}

/// Text after the first `separator`; empty when absent.
fn after(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let separator = args.get_or(0, "");
    if separator.is_empty() {
        return Ok(Some(text.into_data()));
    }
    let value = match text.value.find(separator) {
        Some(pos) => text.value[pos + separator.len()..].to_string(),
        None => String::new(),
    };
    text.with(value)
}

/// Text between `start` and the following `end`. Ends the chain when either
/// marker is missing.
fn between(text: TextValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let open = args.required(0, "between")?;
    let close = args.get(1).unwrap_or(open);

    let Some(from) = text.value.find(open).map(|p| p + open.len()) else {
        return Ok(None);
    };
    let Some(to) = text.value[from..].find(close).map(|p| p + from) else {
        return Ok(None);
    };

    let value = text.value[from..to].to_string();
    text.with(value)
}

fn list(text: TextValue, args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    let delimiter = args.char(0).unwrap_or(ctx.delimiter());
    let items = if text.value.is_empty() {
        Vec::new()
    } else {
        text.value.split(delimiter).map(str::to_string).collect()
    };
    Ok(Some(ListValue::new(items, delimiter).into_data()))
}

fn number(text: TextValue, _args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    let number = NumberValue::parse(TypeKeyword::Number, &text.value, ctx).map_err(|reason| {
        EvalError::Conversion {
            keyword: TypeKeyword::Number,
            value: text.value.clone(),
            reason,
        }
    })?;
    Ok(Some(number.into_data()))
}

fn sort_lines(text: TextValue, descending: bool) -> OpResult {
    let mut lines: Vec<&str> = text.value.lines().collect();
    lines.sort();
    if descending {
        lines.reverse();
    }
    let value = lines.join("\n");
    text.with(value)
}

fn ascending(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    sort_lines(text, false)
}

fn descending(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    sort_lines(text, true)
}

fn is_empty(text: TextValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let value = text.value.trim().is_empty().to_string();
    text.with(value)
}
