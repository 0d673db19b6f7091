use std::ops::Range;

use crate::ast::{Invocation, TypeKeyword};
use crate::value::DataValue;

/// One recognised `[TYPE(seed) => chain]` unit.
///
/// Built by the parser for a single evaluation pass and dropped afterwards.
/// `matched` and `span` pin the exact occurrence in the pass text, so an
/// identical expression elsewhere in the text is never touched by the
/// substitution.
#[derive(Debug, Clone)]
pub struct Expression {
    pub keyword: TypeKeyword,

    /// Seed text with escapes kept (`\,` etc.)
    pub seed: String,

    pub invocations: Vec<Invocation>,

    /// The recognised text, escapes kept
    pub matched: String,

    /// Byte range of the expression in the encoded pass text
    pub span: Range<usize>,

    /// Seed value; `None` until built (or when only syntax was checked)
    pub value: Option<DataValue>,
}

impl Expression {
    /// Canonical re-rendering: `[TYPE(seed) => op1 op2(args)]`.
    pub fn canonical(&self) -> String {
        if self.invocations.is_empty() {
            return format!("[{}({})]", self.keyword, self.seed);
        }

        let chain: Vec<&str> = self.invocations.iter().map(|i| i.source.as_str()).collect();
        format!("[{}({}) => {}]", self.keyword, self.seed, chain.join(" "))
    }
}
