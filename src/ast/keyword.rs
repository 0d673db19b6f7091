use std::fmt;
use std::str::FromStr;

/// Type keyword opening a bracket expression.
///
/// The set is closed: every keyword maps to exactly one
/// [`DataValue`](crate::value::DataValue) variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKeyword {
    Text,
    Number,
    List,
    Json,
    Xml,
    Csv,
    Date,
    Config,
    Ini,
    Binary,
    /// Result set produced by a host SQL runner
    Sql,
    /// Workbook range produced by a host spreadsheet engine
    Excel,
    /// Response produced by a host HTTP / browser client
    Web,
}

impl TypeKeyword {
    pub const ALL: [TypeKeyword; 13] = [
        TypeKeyword::Text,
        TypeKeyword::Number,
        TypeKeyword::List,
        TypeKeyword::Json,
        TypeKeyword::Xml,
        TypeKeyword::Csv,
        TypeKeyword::Date,
        TypeKeyword::Config,
        TypeKeyword::Ini,
        TypeKeyword::Binary,
        TypeKeyword::Sql,
        TypeKeyword::Excel,
        TypeKeyword::Web,
    ];

    /// The keyword as written in script text.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKeyword::Text => "TEXT",
            TypeKeyword::Number => "NUMBER",
            TypeKeyword::List => "LIST",
            TypeKeyword::Json => "JSON",
            TypeKeyword::Xml => "XML",
            TypeKeyword::Csv => "CSV",
            TypeKeyword::Date => "DATE",
            TypeKeyword::Config => "CONFIG",
            TypeKeyword::Ini => "INI",
            TypeKeyword::Binary => "BINARY",
            TypeKeyword::Sql => "SQL",
            TypeKeyword::Excel => "EXCEL",
            TypeKeyword::Web => "WEB",
        }
    }

    /// Keywords whose values come from a host collaborator.
    pub fn is_external(&self) -> bool {
        matches!(self, TypeKeyword::Sql | TypeKeyword::Excel | TypeKeyword::Web)
    }

    /// Regex alternation of every keyword, longest first.
    pub(crate) fn alternation() -> String {
        let mut names: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        names.join("|")
    }
}

impl fmt::Display for TypeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeKeyword {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeKeyword::ALL
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown type keyword: {}", s))
    }
}
