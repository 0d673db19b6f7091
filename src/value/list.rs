use std::sync::LazyLock;

use rust_decimal::Decimal;

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::escape::{EscapeCodec, Restore};
use crate::evaluator::EvalError;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue, NumberValue, TextValue};

/// Ordered list of text items joined by a delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListValue {
    items: Vec<String>,
    delimiter: char,
}

impl ListValue {
    pub fn new(items: Vec<String>, delimiter: char) -> Self {
        ListValue { items, delimiter }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Splits on `delimiter`; `\<delimiter>` stays inside its item.
    pub fn split(text: &str, delimiter: char) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let codec = EscapeCodec::avoiding(delimiter, text);
        codec
            .encode(text)
            .split(delimiter)
            .map(|item| codec.decode(item, Restore::Literal))
            .collect()
    }

    fn with(mut self, items: Vec<String>) -> OpResult {
        self.items = items;
        Ok(Some(self.into_data()))
    }

    /// Resolves a possibly negative index against the current length.
    fn position(&self, index: i64) -> Option<usize> {
        let len = self.items.len() as i64;
        let resolved = if index < 0 { len + index } else { index };
        (0..len).contains(&resolved).then_some(resolved as usize)
    }
}

impl DataType for ListValue {
    fn parse(_keyword: TypeKeyword, text: &str, ctx: &EvalContext<'_>) -> Result<Self, String> {
        let delimiter = ctx.delimiter();
        Ok(ListValue::new(ListValue::split(text, delimiter), delimiter))
    }

    fn stringify(&self) -> Option<String> {
        Some(self.items.join(&self.delimiter.to_string()))
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::List
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::List(self)
    }
}

static REGISTRY: LazyLock<Registry<ListValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::List, OPERATIONS));

const OPERATIONS: &[OpSpec<ListValue>] = &[
    OpSpec::fixed("ascending", 0, ascending),
    OpSpec::fixed("descending", 0, descending),
    OpSpec::fixed("first", 0, first),
    OpSpec::fixed("last", 0, last),
    OpSpec::fixed("item", 1, item),
    OpSpec::fixed("size", 0, size),
    OpSpec::fixed("length", 0, size),
    OpSpec::variadic("append", 0, append),
    OpSpec::variadic("prepend", 0, prepend),
    OpSpec::fixed("insert", 2, insert),
    OpSpec::fixed("remove", 1, remove),
    OpSpec::variadic("removeItems", 0, remove_items),
    OpSpec::fixed("replace", 2, replace),
    OpSpec::fixed("distinct", 0, distinct),
    OpSpec::fixed("reverse", 0, reverse),
    OpSpec::fixed("pack", 0, pack),
    OpSpec::fixed("contains", 1, contains),
    OpSpec::fixed("index", 1, index),
    OpSpec::fixed("sublist", 2, sublist),
    OpSpec::fixed("join", 1, join),
    OpSpec::fixed("sum", 0, sum),
    OpSpec::fixed("count", 1, count),
];

/// Numeric ordering when every item is a number, text ordering otherwise.
fn sorted(mut items: Vec<String>) -> Vec<String> {
    let numbers: Option<Vec<Decimal>> = items
        .iter()
        .map(|item| NumberValue::parse_decimal(item).ok())
        .collect();

    match numbers {
        Some(numbers) if !numbers.is_empty() => {
            let mut paired: Vec<(Decimal, String)> = numbers.into_iter().zip(items).collect();
            paired.sort_by(|a, b| a.0.cmp(&b.0));
            paired.into_iter().map(|(_, item)| item).collect()
        }
        _ => {
            items.sort();
            items
        }
    }
}

fn ascending(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let items = sorted(list.items.clone());
    list.with(items)
}

fn descending(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut items = sorted(list.items.clone());
    items.reverse();
    list.with(items)
}

fn text_of(item: Option<&String>) -> OpResult {
    Ok(item.map(|s| TextValue::new(s.clone()).into_data()))
}

fn first(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    text_of(list.items.first())
}

fn last(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    text_of(list.items.last())
}

/// Item at a zero-based (or negative, from the end) index.
fn item(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let index = args.int(0, "item")?.unwrap_or(0);
    text_of(list.position(index).and_then(|i| list.items.get(i)))
}

fn size(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(NumberValue::from(list.items.len() as i64).into_data()))
}

fn append(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut items = list.items.clone();
    items.extend(args.rest().iter().cloned());
    list.with(items)
}

fn prepend(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut items = args.rest().to_vec();
    items.extend(list.items.iter().cloned());
    list.with(items)
}

fn insert(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let index = args.int(0, "insert")?.unwrap_or(0).max(0) as usize;
    let value = args.get_or(1, "").to_string();
    let mut items = list.items.clone();
    items.insert(index.min(items.len()), value);
    list.with(items)
}

fn remove(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let Some(index) = args.int(0, "remove")? else {
        return Ok(Some(list.into_data()));
    };
    let mut items = list.items.clone();
    if let Some(position) = list.position(index) {
        items.remove(position);
    }
    list.with(items)
}

fn remove_items(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let unwanted = args.rest();
    let items = list
        .items
        .iter()
        .filter(|item| !unwanted.contains(*item))
        .cloned()
        .collect();
    list.with(items)
}

fn replace(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let search = args.required(0, "replace")?;
    let replacement = args.get_or(1, "");
    let items = list
        .items
        .iter()
        .map(|item| {
            if item == search {
                replacement.to_string()
            } else {
                item.clone()
            }
        })
        .collect();
    list.with(items)
}

fn distinct(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut items: Vec<String> = Vec::with_capacity(list.items.len());
    for item in &list.items {
        if !items.contains(item) {
            items.push(item.clone());
        }
    }
    list.with(items)
}

fn reverse(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let items = list.items.iter().rev().cloned().collect();
    list.with(items)
}

/// Drops blank items.
fn pack(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let items = list
        .items
        .iter()
        .filter(|item| !item.trim().is_empty())
        .cloned()
        .collect();
    list.with(items)
}

fn contains(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let needle = args.get_or(0, "");
    let found = list.items.iter().any(|item| item == needle);
    Ok(Some(TextValue::new(found.to_string()).into_data()))
}

/// Zero-based position of the first match, -1 when absent.
fn index(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let needle = args.get_or(0, "");
    let position = list
        .items
        .iter()
        .position(|item| item == needle)
        .map(|p| p as i64)
        .unwrap_or(-1);
    Ok(Some(NumberValue::from(position).into_data()))
}

fn sublist(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let len = list.items.len() as i64;
    let start = args.int(0, "sublist")?.unwrap_or(0).clamp(0, len) as usize;
    let end = args.int(1, "sublist")?.unwrap_or(len).clamp(0, len) as usize;
    let items = if start >= end {
        Vec::new()
    } else {
        list.items[start..end].to_vec()
    };
    list.with(items)
}

fn join(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let separator = args.get_or(0, "");
    Ok(Some(TextValue::new(list.items.join(separator)).into_data()))
}

fn sum(list: ListValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let mut total = Decimal::ZERO;
    for item in list.items.iter().filter(|i| !i.trim().is_empty()) {
        let n = NumberValue::parse_decimal(item).map_err(|reason| EvalError::InvalidArgument {
            function: "sum".to_string(),
            reason,
        })?;
        total = total.checked_add(n).ok_or_else(|| EvalError::InvalidArgument {
            function: "sum".to_string(),
            reason: "numeric overflow".to_string(),
        })?;
    }
    Ok(Some(NumberValue::new(total).into_data()))
}

fn count(list: ListValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let needle = args.get_or(0, "");
    let occurrences = list.items.iter().filter(|item| *item == needle).count();
    Ok(Some(NumberValue::from(occurrences as i64).into_data()))
}
