//! Typed values carried through an operation chain.
//!
//! [`DataValue`] is a closed union: one variant per type keyword. Every
//! variant wraps a type implementing [`DataType`], which supplies parsing,
//! stringifying, snapshotting and the operation registry.
//!
//! # Value semantics
//!
//! Operations take the carrier by value and hand back the next carrier, so
//! a value in the pipeline is never aliased. Anything written to the
//! named-value store goes through [`DataType::snapshot`], an explicit copy,
//! which keeps stored values independent of later changes to the live one.
//!
//! # Examples
//!
//! ```
//! use typeflow::value::{DataValue, ListValue, TextValue};
//!
//! let text = DataValue::Text(TextValue::new("hello"));
//! assert_eq!(text.stringify().as_deref(), Some("hello"));
//!
//! let list = DataValue::List(ListValue::new(vec!["a".into(), "b".into()], ','));
//! assert_eq!(list.stringify().as_deref(), Some("a,b"));
//! ```

mod binary;
mod config;
mod delimited;
mod date;
mod external;
mod ini;
mod json;
mod list;
mod number;
mod text;
mod xml;

pub use binary::BinaryValue;
pub use config::ConfigValue;
pub use delimited::CsvValue;
pub use date::DateValue;
pub use external::ExternalValue;
pub use ini::IniValue;
pub use json::JsonValue;
pub use list::ListValue;
pub use number::NumberValue;
pub use text::TextValue;
pub use xml::{XmlChild, XmlNode, XmlValue};

pub(crate) use json::string_items;

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::registry::{Arity, OpResult, Registry};

/// Capabilities every data type provides.
pub trait DataType: Clone + Sized + 'static {
    /// Builds a value from literal text. The error is a human-readable
    /// reason; the builder wraps it with the keyword and seed.
    fn parse(keyword: TypeKeyword, text: &str, ctx: &EvalContext<'_>) -> Result<Self, String>;

    /// Textual form. `None` when the value has no textual form (e.g. JSON
    /// `null`).
    fn stringify(&self) -> Option<String>;

    /// Independent copy for the named-value store.
    fn snapshot(&self) -> Self {
        self.clone()
    }

    fn keyword(&self) -> TypeKeyword;

    fn registry() -> &'static Registry<Self>;

    fn into_data(self) -> DataValue;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Text(TextValue),
    Number(NumberValue),
    List(ListValue),
    Json(JsonValue),
    Xml(XmlValue),
    Csv(CsvValue),
    Date(DateValue),
    Config(ConfigValue),
    Ini(IniValue),
    Binary(BinaryValue),
    /// `SQL`, `EXCEL` and `WEB` results
    External(ExternalValue),
}

impl DataValue {
    /// Parses `text` into the variant named by `keyword`.
    pub fn parse(keyword: TypeKeyword, text: &str, ctx: &EvalContext<'_>) -> Result<Self, String> {
        Ok(match keyword {
            TypeKeyword::Text => TextValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Number => NumberValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::List => ListValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Json => JsonValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Xml => XmlValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Csv => CsvValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Date => DateValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Config => ConfigValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Ini => IniValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Binary => BinaryValue::parse(keyword, text, ctx)?.into_data(),
            TypeKeyword::Sql | TypeKeyword::Excel | TypeKeyword::Web => {
                ExternalValue::parse(keyword, text, ctx)?.into_data()
            }
        })
    }

    pub fn keyword(&self) -> TypeKeyword {
        match self {
            DataValue::Text(v) => v.keyword(),
            DataValue::Number(v) => v.keyword(),
            DataValue::List(v) => v.keyword(),
            DataValue::Json(v) => v.keyword(),
            DataValue::Xml(v) => v.keyword(),
            DataValue::Csv(v) => v.keyword(),
            DataValue::Date(v) => v.keyword(),
            DataValue::Config(v) => v.keyword(),
            DataValue::Ini(v) => v.keyword(),
            DataValue::Binary(v) => v.keyword(),
            DataValue::External(v) => v.keyword(),
        }
    }

    pub fn stringify(&self) -> Option<String> {
        match self {
            DataValue::Text(v) => v.stringify(),
            DataValue::Number(v) => v.stringify(),
            DataValue::List(v) => v.stringify(),
            DataValue::Json(v) => v.stringify(),
            DataValue::Xml(v) => v.stringify(),
            DataValue::Csv(v) => v.stringify(),
            DataValue::Date(v) => v.stringify(),
            DataValue::Config(v) => v.stringify(),
            DataValue::Ini(v) => v.stringify(),
            DataValue::Binary(v) => v.stringify(),
            DataValue::External(v) => v.stringify(),
        }
    }

    pub fn snapshot(&self) -> DataValue {
        match self {
            DataValue::Text(v) => v.snapshot().into_data(),
            DataValue::Number(v) => v.snapshot().into_data(),
            DataValue::List(v) => v.snapshot().into_data(),
            DataValue::Json(v) => v.snapshot().into_data(),
            DataValue::Xml(v) => v.snapshot().into_data(),
            DataValue::Csv(v) => v.snapshot().into_data(),
            DataValue::Date(v) => v.snapshot().into_data(),
            DataValue::Config(v) => v.snapshot().into_data(),
            DataValue::Ini(v) => v.snapshot().into_data(),
            DataValue::Binary(v) => v.snapshot().into_data(),
            DataValue::External(v) => v.snapshot().into_data(),
        }
    }

    /// Dispatches `name(args)` through this variant's registry.
    pub fn invoke(self, name: &str, args: Vec<String>, ctx: &mut EvalContext<'_>) -> OpResult {
        match self {
            DataValue::Text(v) => TextValue::registry().invoke(v, name, args, ctx),
            DataValue::Number(v) => NumberValue::registry().invoke(v, name, args, ctx),
            DataValue::List(v) => ListValue::registry().invoke(v, name, args, ctx),
            DataValue::Json(v) => JsonValue::registry().invoke(v, name, args, ctx),
            DataValue::Xml(v) => XmlValue::registry().invoke(v, name, args, ctx),
            DataValue::Csv(v) => CsvValue::registry().invoke(v, name, args, ctx),
            DataValue::Date(v) => DateValue::registry().invoke(v, name, args, ctx),
            DataValue::Config(v) => ConfigValue::registry().invoke(v, name, args, ctx),
            DataValue::Ini(v) => IniValue::registry().invoke(v, name, args, ctx),
            DataValue::Binary(v) => BinaryValue::registry().invoke(v, name, args, ctx),
            DataValue::External(v) => {
                // one registry serves all three external keywords
                let keyword = v.keyword();
                ExternalValue::registry()
                    .invoke(v, name, args, ctx)
                    .map_err(|e| e.for_keyword(keyword))
            }
        }
    }

    /// Declared operations of the variant behind `keyword`.
    pub fn operations(keyword: TypeKeyword) -> &'static [(&'static str, Arity)] {
        match keyword {
            TypeKeyword::Text => TextValue::registry().names(),
            TypeKeyword::Number => NumberValue::registry().names(),
            TypeKeyword::List => ListValue::registry().names(),
            TypeKeyword::Json => JsonValue::registry().names(),
            TypeKeyword::Xml => XmlValue::registry().names(),
            TypeKeyword::Csv => CsvValue::registry().names(),
            TypeKeyword::Date => DateValue::registry().names(),
            TypeKeyword::Config => ConfigValue::registry().names(),
            TypeKeyword::Ini => IniValue::registry().names(),
            TypeKeyword::Binary => BinaryValue::registry().names(),
            TypeKeyword::Sql | TypeKeyword::Excel | TypeKeyword::Web => {
                ExternalValue::registry().names()
            }
        }
    }
}
