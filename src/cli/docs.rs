//! Documentation content for typeflow CLI

use std::fmt::Write as _;

use crate::ast::TypeKeyword;
use crate::value::DataValue;

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Escaping,
    Chains,
    Types,
    Variables,
    Errors,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "escaping" | "escape" | "escapes" => Some(Self::Escaping),
            "chains" | "chain" | "functions" | "operations" => Some(Self::Chains),
            "types" | "type" => Some(Self::Types),
            "variables" | "variable" | "vars" | "store" => Some(Self::Variables),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"TYPEFLOW DOCUMENTATION

Typeflow resolves typed pipeline expressions embedded in ordinary text. Each
expression turns a seed into a typed value, runs it through a chain of
operations and is replaced by the resulting text.

DOCUMENTATION CATEGORIES

  syntax            Expression grammar and how results replace the expression
  escaping          Literal parentheses, commas and brackets inside arguments
  chains            Operation chains, arguments and arity rules
  types             The type keywords and what their seeds look like
  variables         Storing results and resuming them by name
  errors            What happens when an expression cannot be evaluated

QUICK REFERENCE

  [TEXT(hello) => upper]              HELLO
  [LIST(b,a,c) => ascending first]    a
  [NUMBER(2.50) => add(1.25)]         3.75
  [TEXT(a\,b) => append(\,c)]         a,b,c
  [LIST(x,y) => store(v) size]        2   (and v holds the list)

Run 'typeflow doc <category>' for detailed documentation.
Run 'typeflow functions [TYPE]' to list the operations of each type.
Run 'typeflow onboard' for a guided tour.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_str(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Escaping) => Ok(ESCAPING_DOC),
        Some(DocCategory::Chains) => Ok(CHAINS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        Some(DocCategory::Variables) => Ok(VARIABLES_DOC),
        Some(DocCategory::Errors) => Ok(ERRORS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

/// Operation listing for one type, or for every type when `keyword` is
/// `None`. Arity is shown as a count, `n+` for variadic operations.
pub fn list_functions(keyword: Option<&str>) -> Result<String, CliError> {
    let keywords: Vec<TypeKeyword> = match keyword {
        Some(name) => vec![
            name.parse()
                .map_err(|_| CliError::UnknownType(name.to_string()))?,
        ],
        None => TypeKeyword::ALL.to_vec(),
    };

    let mut out = String::new();
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", keyword);
        for (name, arity) in DataValue::operations(*keyword) {
            let _ = writeln!(out, "  {:<16} {}", name, arity);
        }
    }
    Ok(out)
}

const SYNTAX_DOC: &str = r#"SYNTAX - Expression Grammar

EXPRESSION
  [TYPE(seed)]
  [TYPE(seed) => operation1 operation2(arg) operation3(arg, arg)]

    TYPE is one of the type keywords (see 'typeflow doc types'). The seed is
    parsed into a value of that type, each operation is applied in order,
    and the final value's text replaces the whole bracket expression.

    Example:
      Input:  Hello [TEXT(world) => upper]!
      Output: Hello WORLD!

EMBEDDING
  Expressions may appear anywhere in a larger text. Text around them is left
  untouched, and two identical expressions at different places are each
  replaced on their own.

NESTING
  An expression may appear inside the seed or arguments of another. The
  innermost expression is resolved first and its result becomes part of the
  outer expression:

    [LIST(a,[TEXT(b) => upper],c) => join(-)]      a-B-c

  A result that is itself an expression is resolved again, until no
  expression is left.

  When a nested expression cannot be evaluated it stays as written, and so
  does the expression around it.

ORDER
  Side-by-side expressions resolve left to right, so a value stored by one
  can be resumed by a later one:

    [LIST(a,b,c) => store(x)] has [LIST(x) => size] items
    a,b,c has 3 items

WHITESPACE
  Whitespace around '=>' and between operations is ignored. Whitespace
  between an operation name and its '(' is allowed:

    [TEXT(x) => append (y)]                         xy
"#;

const ESCAPING_DOC: &str = r#"ESCAPING - Literal Structure Characters

Parentheses, commas and the closing bracket give an expression its shape.
To use one of them as plain data, put a backslash in front of it:

  \(    literal (
  \)    literal )
  \,    literal ,   (also the configured delimiter, if different)
  \]    literal ]

  Examples:
    [TEXT(a\,b) => append(\,c)]          a,b,c
    [TEXT(f) => append(\(x\))]           f(x)
    [LIST(a\,b,c) => size]               2

ALTERNATE ARGUMENT SEPARATOR
  When an operation's arguments contain many commas, separate them with
  ' %% ' (space, two percent signs, space) instead. Inside that argument
  list commas are ordinary characters:

    [TEXT(a-b) => replace(- %% , )]      a, b

BALANCED PARENTHESES
  Unescaped parentheses inside an argument are fine as long as they pair
  up:

    [TEXT(x) => append((y))]             x(y)
"#;

const CHAINS_DOC: &str = r#"CHAINS - Operations, Arguments and Arity

CHAIN
  Operations run left to right. Each operation receives the value produced
  by the previous one. Order matters:

    [LIST(b,a,c) => ascending first]     a
    [LIST(b,a,c) => first ascending]     b

  An operation may change the type of the value. 'first' turns a LIST into
  TEXT, 'length' turns TEXT into NUMBER, 'extract' pulls TEXT, NUMBER or
  JSON out of a JSON document.

NAMES
  Every operation answers to its camelCase name and to a hyphenated
  lower-case spelling:

    removeStart    remove-start
    sortAscending  sort-ascending

ARGUMENTS
  Arguments are split on the delimiter (',' unless configured otherwise).
  Argument text is used exactly as written, including spaces.

    [TEXT(a) => append(b,c)]             abc

ARITY
  Every operation declares how many arguments it takes.

  - Fewer arguments than declared is fine: missing ones are treated as
    absent and the operation uses its default.
  - More arguments than declared is an error, except for variadic
    operations (listed as 'n+'), which collect any number of extra ones.

SHARED OPERATIONS
  Every type supports:

    store(name)    keep a copy of the current value under 'name'
                   (without a name nothing is stored)
    text           continue with the value's text as TEXT

ENDING A CHAIN
  Some operations find nothing to return (extracting a missing JSON path,
  'between' with an absent marker). The chain stops and the expression is
  left in the text as written.

Run 'typeflow functions TYPE' for the operations of one type.
"#;

const TYPES_DOC: &str = r#"TYPES - Type Keywords and Seeds

  TEXT      Any text.
  NUMBER    Exact decimal: 42, -3.5, 2.50, 1e3. Scale is kept (2.50 stays 2.50).
  LIST      Items separated by the delimiter: a,b,c. Empty seed = empty list.
  JSON      A JSON document. Paths: a.b[0], items[-1].name, $ for the root.
  XML       An XML document. Paths: book[2]/title, /catalog/book, item/@id.
  CSV       Delimited table; the first row is the header.
  DATE      2024-03-14, 2024-03-14 09:30:00, 2024-03-14T09:30:00Z,
            03/14/2024, now, today, or epoch milliseconds.
  CONFIG    Properties: key=value lines, '#' and '!' comments.
  INI       [section] headers with key=value lines, ';' and '#' comments.
  BINARY    base64:SGk=, hex:4869, or plain text taken as UTF-8 bytes.
  SQL       Result of the host's SQL runner for the seed.
  EXCEL     Result of the host's spreadsheet engine for the seed.
  WEB       Result of the host's web client for the seed.

SQL, EXCEL and WEB need a collaborator registered by the host program. A
failure reported by the collaborator does not stop the chain: it is
available through the 'error' operation.

A seed that cannot be read as its type (NUMBER(abc), JSON({)) is an error.
"#;

const VARIABLES_DOC: &str = r#"VARIABLES - Storing and Resuming Values

STORE
  store(name) keeps an independent copy of the current value. The chain
  continues with the value unchanged, and later operations never affect
  the stored copy.

    [LIST(c,a,b) => store(items) ascending]      a,b,c   (items is c,a,b)

RESUME
  When a seed is a bare name (letters, digits, '_', '.', '-') and a value
  of the same type is stored under that name, the stored value is used
  instead of parsing the name as text:

    [LIST(items) => size]                        3

  LIST also resumes host arrays and JSON arrays. A name with no stored
  value of the right type is parsed as ordinary text.

HOST VARIABLES
  typeflow process --var name=value        stores TEXT
  typeflow process --vars vars.json        strings -> TEXT, numbers -> NUMBER,
                                           arrays -> lists, objects -> JSON
"#;

const ERRORS_DOC: &str = r#"ERRORS - When Evaluation Fails

CONVERSION ERRORS
  The seed cannot be read as its type: NUMBER(abc), JSON({). Evaluation
  stops with an error. With --syntax-only the expression is reported as
  not found instead.

UNKNOWN FUNCTIONS AND TOO MANY ARGUMENTS
  Authoring mistakes. Evaluation stops with an error naming the type and
  the operation:

    [TEXT(a) => shout]                Unknown function 'shout' for TEXT
    [TEXT(a) => upper(x)]             Function 'upper' for TEXT takes 0
                                      argument(s), got 1

MALFORMED CHAINS
  Unbalanced parentheses in a chain are reported as a warning on stderr
  and the expression is left in the text as written.

PASS LIMIT
  Every substituted expression counts as one pass. Text that keeps
  producing new expressions stops with an error after --max-passes
  passes (1024 by default).
"#;
