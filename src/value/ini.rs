use std::sync::LazyLock;

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::config::{Entries, lookup, parse_entry, render, upsert};
use crate::value::{DataType, DataValue, ListValue, TextValue};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    entries: Entries,
}

/// INI document. Entries before the first `[section]` header belong to the
/// unnamed section `""`. Comments start with `;` or `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniValue {
    sections: Vec<Section>,
}

impl IniValue {
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| lookup(&s.entries, key))
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter(|s| !s.name.is_empty())
            .map(|s| s.name.clone())
            .collect()
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }
}

impl DataType for IniValue {
    fn parse(_keyword: TypeKeyword, text: &str, _ctx: &EvalContext<'_>) -> Result<Self, String> {
        let mut ini = IniValue {
            sections: vec![Section {
                name: String::new(),
                entries: Vec::new(),
            }],
        };
        let mut current = String::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| format!("Unterminated section header '{}'", line))?;
                current = name.trim().to_string();
                ini.section_mut(&current);
                continue;
            }
            let (key, value) = parse_entry(line);
            if key.is_empty() {
                return Err(format!("Missing key in line '{}'", line));
            }
            upsert(&mut ini.section_mut(&current).entries, &key, &value);
        }
        Ok(ini)
    }

    fn stringify(&self) -> Option<String> {
        let mut blocks = Vec::new();
        for section in &self.sections {
            if section.name.is_empty() {
                if !section.entries.is_empty() {
                    blocks.push(render(&section.entries));
                }
                continue;
            }
            let mut block = format!("[{}]", section.name);
            if !section.entries.is_empty() {
                block.push('\n');
                block.push_str(&render(&section.entries));
            }
            blocks.push(block);
        }
        Some(blocks.join("\n\n"))
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Ini
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Ini(self)
    }
}

static REGISTRY: LazyLock<Registry<IniValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Ini, OPERATIONS));

const OPERATIONS: &[OpSpec<IniValue>] = &[
    OpSpec::fixed("value", 2, value),
    OpSpec::fixed("set", 3, set),
    OpSpec::fixed("remove", 2, remove),
    OpSpec::fixed("sections", 0, sections),
    OpSpec::fixed("keys", 1, keys),
];

fn value(ini: IniValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let section = args.get_or(0, "").trim();
    let key = args.get_or(1, "").trim();
    Ok(ini.get(section, key).map(|v| TextValue::new(v).into_data()))
}

fn set(mut ini: IniValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let section = args.get_or(0, "").trim();
    let key = args.required(1, "set")?.trim();
    upsert(&mut ini.section_mut(section).entries, key, args.get_or(2, ""));
    Ok(Some(ini.into_data()))
}

/// Removes one key, or the whole section when no key is given.
fn remove(mut ini: IniValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let section = args.get_or(0, "").trim();
    match args.get(1).map(str::trim) {
        Some(key) if !key.is_empty() => {
            if let Some(s) = ini.sections.iter_mut().find(|s| s.name == section) {
                s.entries.retain(|(k, _)| k != key);
            }
        }
        _ => ini.sections.retain(|s| s.name != section || s.name.is_empty()),
    }
    Ok(Some(ini.into_data()))
}

fn sections(ini: IniValue, _args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(Some(ListValue::new(ini.section_names(), ctx.delimiter()).into_data()))
}

fn keys(ini: IniValue, args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    let section = args.get_or(0, "").trim();
    let keys = ini
        .section(section)
        .map(|s| s.entries.iter().map(|(k, _)| k.clone()).collect())
        .unwrap_or_default();
    Ok(Some(ListValue::new(keys, ctx.delimiter()).into_data()))
}
