//! Recognition of bracket expressions inside free text.
//!
//! The parser works on text already encoded by the [`EscapeCodec`], so
//! escaped structure (`\)`, `\]`, `\,`) is invisible to it. Every
//! `[KEYWORD(` opening is a candidate. Nested expressions resolve before
//! the expressions that contain them, and side-by-side expressions resolve
//! left to right.

use std::cmp::Reverse;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{trace, warn};

use crate::ast::{Expression, Invocation, TypeKeyword};
use crate::escape::{EscapeCodec, Restore};
use crate::lexer::{LexError, Lexer};

/// Local override for the argument delimiter: `f(a,b %% c,d)` has the two
/// arguments `a,b` and `c,d`.
pub const PARAM_SEPARATOR: &str = " %% ";

static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"\[\s*({})\s*\(", TypeKeyword::alternation());
    Regex::new(&pattern).expect("keyword alternation is a valid pattern")
});

pub struct Parser<'c> {
    codec: &'c EscapeCodec,
    delimiter: char,
}

impl<'c> Parser<'c> {
    pub fn new(codec: &'c EscapeCodec, delimiter: char) -> Self {
        Parser { codec, delimiter }
    }

    /// Every well-formed expression in `encoded`, in resolution order: an
    /// expression comes after the expressions nested inside it, and
    /// siblings come in reading order. Candidates with a malformed chain
    /// are logged and skipped, which leaves their text untouched.
    pub fn find_all(&self, encoded: &str) -> Vec<Expression> {
        let mut expressions: Vec<Expression> = CANDIDATE
            .captures_iter(encoded)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let keyword = caps.get(1)?.as_str().parse().ok()?;
                Some((whole.start(), whole.end(), keyword))
            })
            .filter_map(|(start, seed_start, keyword)| {
                match self.parse_at(encoded, start, seed_start, keyword) {
                    Ok(found) => found,
                    Err(e) => {
                        warn!(error = %e, position = start, "Leaving malformed expression as text");
                        None
                    }
                }
            })
            .collect();

        // a nested expression always closes before its parent
        expressions.sort_by_key(|e| (e.span.end, Reverse(e.span.start)));
        for expression in &expressions {
            trace!(matched = %expression.matched, "Recognised expression");
        }
        expressions
    }

    /// The expression that resolves first, if any.
    pub fn find_first(&self, encoded: &str) -> Option<Expression> {
        self.find_all(encoded).into_iter().next()
    }

    /// Parses the expression whose `[` is at `start`; `seed_start` is just
    /// past its `(`. `Ok(None)` when the text there is not a complete
    /// expression.
    pub fn parse_at(
        &self,
        encoded: &str,
        start: usize,
        seed_start: usize,
        keyword: TypeKeyword,
    ) -> Result<Option<Expression>, LexError> {
        let Some((seed_end, after_seed)) = find_seed_end(encoded, seed_start) else {
            return Ok(None);
        };
        let seed = &encoded[seed_start..seed_end];

        let (invocations, end) = if encoded[after_seed..].starts_with(']') {
            (Vec::new(), after_seed + 1)
        } else {
            let chain_start = after_seed + "=>".len();
            let Some(close) = find_chain_end(encoded, chain_start) else {
                return Ok(None);
            };
            (self.parse_chain(&encoded[chain_start..close])?, close + 1)
        };

        Ok(Some(Expression {
            keyword,
            seed: self.codec.decode(seed, Restore::Escaped),
            invocations,
            matched: self.codec.decode(&encoded[start..end], Restore::Escaped),
            span: start..end,
            value: None,
        }))
    }

    /// Splits a chain into invocations with unescaped arguments.
    pub fn parse_chain(&self, chain: &str) -> Result<Vec<Invocation>, LexError> {
        Lexer::tokenize(chain)?
            .into_iter()
            .map(|token| {
                let args = match &token.params {
                    Some(params) => self.split_params(params),
                    None => Vec::new(),
                };
                Ok(Invocation {
                    name: self.codec.decode(token.name.trim(), Restore::Literal),
                    args,
                    source: self.codec.decode(&token.source, Restore::Escaped),
                })
            })
            .collect()
    }

    /// Splits a raw parameter list. Blank lists have no arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeflow::escape::EscapeCodec;
    /// use typeflow::parser::Parser;
    ///
    /// let codec = EscapeCodec::new(',');
    /// let parser = Parser::new(&codec, ',');
    ///
    /// assert_eq!(parser.split_params(&codec.encode(r"a\,b,c")), vec!["a,b", "c"]);
    /// assert_eq!(parser.split_params("x,y %% z"), vec!["x,y", "z"]);
    /// assert!(parser.split_params("  ").is_empty());
    /// ```
    pub fn split_params(&self, params: &str) -> Vec<String> {
        if params.trim().is_empty() {
            return Vec::new();
        }

        let parts: Vec<&str> = if params.contains(PARAM_SEPARATOR) {
            params.split(PARAM_SEPARATOR).collect()
        } else {
            params.split(self.delimiter).collect()
        };

        parts
            .into_iter()
            .map(|part| self.codec.decode(part, Restore::Literal))
            .collect()
    }
}

/// Finds the `)` closing the seed: the first one outside any nested
/// `[...]` that is followed (after optional whitespace) by `]` or `=>`.
/// Returns its offset and the offset of that `]` / `=>`.
fn find_seed_end(encoded: &str, from: usize) -> Option<(usize, usize)> {
    let mut brackets = 0usize;
    for (offset, ch) in encoded[from..].char_indices() {
        let at = from + offset;
        match ch {
            '[' => brackets += 1,
            ']' => brackets = brackets.saturating_sub(1),
            ')' if brackets == 0 => {
                let rest = &encoded[at + 1..];
                let trimmed = rest.trim_start();
                if trimmed.starts_with(']') || trimmed.starts_with("=>") {
                    return Some((at, at + 1 + (rest.len() - trimmed.len())));
                }
            }
            _ => {}
        }
    }
    None
}

/// Offset of the `]` ending a chain: the first one outside parentheses.
fn find_chain_end(encoded: &str, from: usize) -> Option<usize> {
    let mut parens = 0usize;
    for (offset, ch) in encoded[from..].char_indices() {
        match ch {
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            ']' if parens == 0 => return Some(from + offset),
            _ => {}
        }
    }
    None
}
