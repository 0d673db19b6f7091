//! Per-type operation tables.
//!
//! Each data type declares a static slice of [`OpSpec`]s. The first time a
//! type is used its [`Registry`] is built from that slice (plus the
//! operations every type shares) and kept for the life of the process.
//! Every operation is reachable under its declared camelCase name and under
//! the hyphenated lower-case spelling (`removeStart` / `remove-start`).

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::ast::TypeKeyword;
use crate::context::{EvalContext, StoredValue};
use crate::evaluator::EvalError;
use crate::value::{DataType, DataValue, TextValue};

/// Number of string parameters an operation takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many slots; missing trailing ones are passed as null
    Fixed(usize),
    /// `min` positional slots followed by a catch-all list
    Variadic { min: usize },
}

impl Arity {
    /// Integer encoding: `n` for fixed arity, `-(min + 1)` for variadic.
    ///
    /// ```
    /// use typeflow::registry::Arity;
    ///
    /// assert_eq!(Arity::Fixed(2).encoded(), 2);
    /// assert_eq!(Arity::Variadic { min: 1 }.encoded(), -2);
    /// assert_eq!(Arity::from_encoded(-1), Arity::Variadic { min: 0 });
    /// ```
    pub fn encoded(&self) -> i32 {
        match self {
            Arity::Fixed(n) => *n as i32,
            Arity::Variadic { min } => -(*min as i32) - 1,
        }
    }

    pub fn from_encoded(code: i32) -> Self {
        if code >= 0 {
            Arity::Fixed(code as usize)
        } else {
            Arity::Variadic {
                min: (-(code + 1)) as usize,
            }
        }
    }

    /// Too few arguments are always accepted; too many only when variadic.
    pub fn accepts(&self, supplied: usize) -> bool {
        match self {
            Arity::Fixed(n) => supplied <= *n,
            Arity::Variadic { .. } => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Variadic { min } => write!(f, "{}+", min),
        }
    }
}

/// Arguments bound to an operation's slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    values: Vec<Option<String>>,
    rest: Vec<String>,
}

impl Args {
    /// Pads missing positional slots with `None`; for variadic arity the
    /// surplus goes to [`rest`](Self::rest).
    pub fn bind(arity: Arity, mut supplied: Vec<String>) -> Self {
        let slots = match arity {
            Arity::Fixed(n) => n,
            Arity::Variadic { min } => min,
        };

        let rest = if supplied.len() > slots {
            supplied.split_off(slots)
        } else {
            Vec::new()
        };

        let mut values: Vec<Option<String>> = supplied.into_iter().map(Some).collect();
        values.resize(slots, None);

        Args { values, rest }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    pub fn get_or<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
        self.get(index).unwrap_or(default)
    }

    pub fn required(&self, index: usize, function: &str) -> Result<&str, EvalError> {
        self.get(index).ok_or_else(|| EvalError::InvalidArgument {
            function: function.to_string(),
            reason: format!("argument {} is required", index + 1),
        })
    }

    /// Integer argument; `None` when the slot is null or blank.
    pub fn int(&self, index: usize, function: &str) -> Result<Option<i64>, EvalError> {
        match self.get(index).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| EvalError::InvalidArgument {
                function: function.to_string(),
                reason: format!("'{}' is not an integer", raw),
            }),
        }
    }

    /// Single-character argument; `None` when the slot is null or empty.
    pub fn char(&self, index: usize) -> Option<char> {
        self.get(index).and_then(|s| s.chars().next())
    }

    /// Variadic tail.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// Positional values that were supplied followed by the variadic tail.
    pub fn all(&self) -> Vec<&str> {
        self.values
            .iter()
            .flatten()
            .map(String::as_str)
            .chain(self.rest.iter().map(String::as_str))
            .collect()
    }
}

pub type OpResult = Result<Option<DataValue>, EvalError>;

/// An operation body. Receives the carrier by value and returns the next
/// carrier, or `None` to end the chain.
pub type Operation<T> = fn(T, &Args, &mut EvalContext<'_>) -> OpResult;

/// Declaration of one operation.
pub struct OpSpec<T> {
    pub name: &'static str,
    pub arity: Arity,
    pub call: Operation<T>,
}

impl<T> OpSpec<T> {
    pub const fn fixed(name: &'static str, count: usize, call: Operation<T>) -> Self {
        OpSpec {
            name,
            arity: Arity::Fixed(count),
            call,
        }
    }

    pub const fn variadic(name: &'static str, min: usize, call: Operation<T>) -> Self {
        OpSpec {
            name,
            arity: Arity::Variadic { min },
            call,
        }
    }
}

impl<T> Clone for OpSpec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OpSpec<T> {}

/// Immutable name -> (arity, callable) table for one data type.
pub struct Registry<T> {
    keyword: TypeKeyword,
    entries: HashMap<String, OpSpec<T>>,
    declared: Vec<(&'static str, Arity)>,
}

impl<T: DataType> Registry<T> {
    pub fn new(keyword: TypeKeyword, operations: &[OpSpec<T>]) -> Self {
        let mut registry = Registry {
            keyword,
            entries: HashMap::new(),
            declared: Vec::new(),
        };

        registry.register(OpSpec::fixed("store", 1, store::<T>));
        registry.register(OpSpec::fixed("text", 0, text::<T>));
        for op in operations {
            registry.register(*op);
        }

        registry.declared.sort_by(|a, b| a.0.cmp(b.0));
        debug!(%keyword, operations = registry.declared.len(), "Built operation registry");
        registry
    }

    fn register(&mut self, spec: OpSpec<T>) {
        let alias = hyphenate(spec.name);
        if alias != spec.name {
            self.entries.insert(alias, spec);
        }
        self.entries.insert(spec.name.to_string(), spec);

        match self.declared.iter_mut().find(|(name, _)| *name == spec.name) {
            Some(existing) => existing.1 = spec.arity,
            None => self.declared.push((spec.name, spec.arity)),
        }
    }

    pub fn keyword(&self) -> TypeKeyword {
        self.keyword
    }

    pub fn arity(&self, name: &str) -> Option<Arity> {
        self.entries.get(name).map(|spec| spec.arity)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Declared names (camelCase spelling) with their arity, sorted.
    pub fn names(&self) -> &[(&'static str, Arity)] {
        &self.declared
    }

    /// Resolves `name`, checks the argument count and runs the operation.
    pub fn invoke(
        &self,
        value: T,
        name: &str,
        args: Vec<String>,
        ctx: &mut EvalContext<'_>,
    ) -> OpResult {
        let spec = self
            .entries
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction {
                keyword: self.keyword,
                name: name.to_string(),
            })?;

        if !spec.arity.accepts(args.len()) {
            return Err(EvalError::Arity {
                keyword: self.keyword,
                name: name.to_string(),
                expected: spec.arity,
                actual: args.len(),
            });
        }

        let bound = Args::bind(spec.arity, args);
        (spec.call)(value, &bound, ctx)
    }
}

/// `removeStart` -> `remove-start`, `toJSON` -> `to-json`.
pub fn hyphenate(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;

    for ch in name.chars() {
        if ch.is_uppercase()
            && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
        {
            result.push('-');
        }
        result.extend(ch.to_lowercase());
        previous = Some(ch);
    }

    result
}

/// `store(var)`: keeps an independent snapshot under `var`; the live value
/// continues down the chain untouched. Without a name nothing is stored.
fn store<T: DataType>(value: T, args: &Args, ctx: &mut EvalContext<'_>) -> OpResult {
    if let Some(name) = args.get(0).map(str::trim).filter(|name| !name.is_empty()) {
        ctx.store.set(name, StoredValue::Data(value.snapshot().into_data()));
    }
    Ok(Some(value.into_data()))
}

/// `text()`: continue as plain text.
fn text<T: DataType>(value: T, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    Ok(value.stringify().map(|s| TextValue::new(s).into_data()))
}
