use std::sync::LazyLock;

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue, ListValue, NumberValue, TextValue};

/// Ordered key/value pairs. Keys are unique; the last occurrence wins.
pub(crate) type Entries = Vec<(String, String)>;

/// Splits `key=value` (or `key: value`) on the first separator. A line
/// without a separator is a key with an empty value.
pub(crate) fn parse_entry(line: &str) -> (String, String) {
    match line.find(['=', ':']) {
        Some(pos) => (
            line[..pos].trim().to_string(),
            line[pos + 1..].trim().to_string(),
        ),
        None => (line.trim().to_string(), String::new()),
    }
}

pub(crate) fn lookup<'a>(entries: &'a Entries, key: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub(crate) fn upsert(entries: &mut Entries, key: &str, value: &str) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((key.to_string(), value.to_string())),
    }
}

pub(crate) fn render(entries: &Entries) -> String {
    entries
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Java-style properties document: `key=value` lines, `#` and `!` comments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigValue {
    entries: Entries,
}

impl ConfigValue {
    pub fn get(&self, key: &str) -> Option<&str> {
        lookup(&self.entries, key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DataType for ConfigValue {
    fn parse(_keyword: TypeKeyword, text: &str, _ctx: &EvalContext<'_>) -> Result<Self, String> {
        let mut config = ConfigValue::default();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = parse_entry(line);
            if key.is_empty() {
                return Err(format!("Missing key in line '{}'", line));
            }
            upsert(&mut config.entries, &key, &value);
        }
        Ok(config)
    }

    fn stringify(&self) -> Option<String> {
        Some(render(&self.entries))
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Config
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Config(self)
    }
}

static REGISTRY: LazyLock<Registry<ConfigValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Config, OPERATIONS));

const OPERATIONS: &[OpSpec<ConfigValue>] = &[
    OpSpec::fixed("value", 1, value),
    OpSpec::fixed("set", 2, set),
    OpSpec::fixed("remove", 1, remove),
    OpSpec::fixed("keys", 0, keys),
    OpSpec::fixed("size", 0, size),
];

fn value(config: ConfigValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let key = args.get_or(0, "").trim();
    Ok(config.get(key).map(|v| TextValue::new(v).into_data()))
}

fn set(mut config: ConfigValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let key = args.required(0, "set")?.trim();
    upsert(&mut config.entries, key, args.get_or(1, ""));
    Ok(Some(config.into_data()))
}

fn remove(mut config: ConfigValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let key = args.get_or(0, "").trim();
    config.entries.retain(|(k, _)| k != key);
    Ok(Some(config.into_data()))
}

fn keys(config: ConfigValue, _args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    let keys = config.entries.into_iter().map(|(k, _)| k).collect();
    Ok(Some(ListValue::new(keys, ctx.delimiter()).into_data()))
}

fn size(config: ConfigValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(NumberValue::from(config.len() as i64).into_data()))
}
