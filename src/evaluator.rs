use std::ops::Range;

use thiserror::Error;
use tracing::debug;

use crate::ast::{Expression, TypeKeyword};
use crate::builder;
use crate::context::{
    Collaborator, Collaborators, ContentResolver, EngineConfig, EvalContext, FileContent,
    LiteralContent, MemoryStore, ValueStore,
};
use crate::escape::{EscapeCodec, Restore};
use crate::parser::Parser;
use crate::registry::Arity;

/// Errors that abort evaluation.
///
/// Format errors in a function chain are not among them: those are logged
/// and the expression is left in the text as written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Seed text cannot be parsed into the requested type
    #[error("Cannot convert '{value}' to {keyword}: {reason}")]
    Conversion {
        keyword: TypeKeyword,
        value: String,
        reason: String,
    },

    /// No operation with this name for the carrier's type
    #[error("Unknown function '{name}' for {keyword}")]
    UnknownFunction { keyword: TypeKeyword, name: String },

    /// More arguments than a fixed-arity operation declares
    #[error("Function '{name}' for {keyword} takes {expected} argument(s), got {actual}")]
    Arity {
        keyword: TypeKeyword,
        name: String,
        expected: Arity,
        actual: usize,
    },

    /// An argument the operation cannot use (e.g. a non-numeric index)
    #[error("Invalid argument for '{function}': {reason}")]
    InvalidArgument { function: String, reason: String },

    /// Text kept producing new expressions past the configured pass limit
    #[error("Evaluation did not settle after {0} passes")]
    PassLimit(usize),
}

impl EvalError {
    /// Re-labels a resolution error with the keyword the author wrote. One
    /// registry serves several external keywords.
    pub fn for_keyword(self, keyword: TypeKeyword) -> Self {
        match self {
            EvalError::UnknownFunction { name, .. } => EvalError::UnknownFunction { keyword, name },
            EvalError::Arity {
                name,
                expected,
                actual,
                ..
            } => EvalError::Arity {
                keyword,
                name,
                expected,
                actual,
            },
            other => other,
        }
    }
}

/// The evaluation driver.
///
/// Owns the host-facing state (configuration, named-value store, content
/// resolver, collaborators) and resolves every bracket expression in a text
/// until none is left.
pub struct Evaluator {
    config: EngineConfig,
    store: Box<dyn ValueStore>,
    resolver: Box<dyn ContentResolver>,
    collaborators: Collaborators,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::with_config(EngineConfig::default())
    }
}

impl Evaluator {
    /// Creates an evaluator with default settings and an empty in-memory
    /// store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let resolver: Box<dyn ContentResolver> = if config.resolve_files {
            Box::new(FileContent)
        } else {
            Box::new(LiteralContent)
        };
        Evaluator {
            config,
            store: Box::new(MemoryStore::new()),
            resolver,
            collaborators: Collaborators::default(),
        }
    }

    /// Replaces the named-value store.
    pub fn with_store(mut self, store: Box<dyn ValueStore>) -> Self {
        self.store = store;
        self
    }

    /// Replaces the content-resolution policy.
    pub fn with_resolver(mut self, resolver: Box<dyn ContentResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn register_collaborator(
        &mut self,
        keyword: TypeKeyword,
        collaborator: Box<dyn Collaborator>,
    ) -> &mut Self {
        self.collaborators.register(keyword, collaborator);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn ValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn ValueStore {
        self.store.as_mut()
    }

    fn context(&mut self) -> EvalContext<'_> {
        EvalContext {
            store: self.store.as_mut(),
            config: &self.config,
            resolver: self.resolver.as_ref(),
            collaborators: &self.collaborators,
        }
    }

    /// Resolves every expression in `text` and returns the resulting text.
    ///
    /// Each pass substitutes one expression and starts over on the new
    /// text, so a result that is itself an expression is resolved as well.
    /// Nested expressions go before the expressions containing them, and
    /// side-by-side expressions go in reading order. An expression that
    /// cannot be evaluated (a chain that ends without a value, a malformed
    /// chain) is left as written, and so is every expression around it.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeflow::Evaluator;
    ///
    /// let mut evaluator = Evaluator::new();
    ///
    /// let result = evaluator.process("[LIST(b,a,c) => ascending() first()]").unwrap();
    /// assert_eq!(result, "a");
    ///
    /// let result = evaluator.process("Total: [NUMBER(1.50) => add(2.25)]").unwrap();
    /// assert_eq!(result, "Total: 3.75");
    /// ```
    pub fn process(&mut self, text: &str) -> Result<String, EvalError> {
        let mut current = text.to_string();
        let mut passes = 0;
        // spans of `current` holding expressions left as written
        let mut settled: Vec<Range<usize>> = Vec::new();

        loop {
            let codec = EscapeCodec::avoiding(self.config.delimiter, &current);
            let parser = Parser::new(&codec, self.config.delimiter);
            let encoded = codec.encode(&current);

            let mut next = None;
            for expression in parser.find_all(&encoded) {
                let start = codec.decode(&encoded[..expression.span.start], Restore::Escaped).len();
                let span = start..start + expression.matched.len();
                if settled.iter().any(|s| span.start <= s.start && s.end <= span.end) {
                    continue;
                }

                match self.evaluate(expression)? {
                    Some(replacement) if replacement != current[span.clone()] => {
                        next = Some((span, replacement));
                        break;
                    }
                    _ => settled.push(span),
                }
            }

            let Some((span, replacement)) = next else {
                debug!(passes, "Evaluation settled");
                return Ok(current);
            };

            passes += 1;
            if passes > self.config.max_passes {
                return Err(EvalError::PassLimit(self.config.max_passes));
            }
            debug!(pass = passes, "Substituted expression");

            settled = shift_settled(settled, &span, replacement.len());
            current.replace_range(span, &replacement);
        }
    }

    /// Recognises the expression [`process`](Self::process) would resolve
    /// first and builds its seed.
    ///
    /// With `syntax_only` a seed that fails to convert is not an error: the
    /// text simply has no expression.
    pub fn parse(&mut self, text: &str, syntax_only: bool) -> Result<Option<Expression>, EvalError> {
        let codec = EscapeCodec::avoiding(self.config.delimiter, text);
        let parser = Parser::new(&codec, self.config.delimiter);
        let Some(mut expression) = parser.find_first(&codec.encode(text)) else {
            return Ok(None);
        };

        let ctx = self.context();
        match builder::build(expression.keyword, &expression.seed, &ctx) {
            Ok(value) => {
                expression.value = Some(value);
                Ok(Some(expression))
            }
            Err(e) if syntax_only => {
                debug!(error = %e, "Ignoring seed error in syntax-only parse");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Evaluates one expression: builds the seed (unless already built),
    /// applies the chain and stringifies the result.
    ///
    /// `Ok(None)` means no replacement: an operation ended the chain, or the
    /// result has no textual form and the expression is already in its
    /// canonical spelling.
    pub fn evaluate(&mut self, expression: Expression) -> Result<Option<String>, EvalError> {
        let canonical = expression.matched == expression.canonical();
        let Expression {
            keyword,
            seed,
            invocations,
            value,
            ..
        } = expression;

        let mut ctx = self.context();
        let mut carrier = match value {
            Some(value) => value,
            None => builder::build(keyword, &seed, &ctx)?,
        };

        for invocation in invocations {
            debug!(keyword = %carrier.keyword(), function = %invocation.name, args = ?invocation.args, "Invoking");
            match carrier.invoke(&invocation.name, invocation.args, &mut ctx)? {
                Some(next) => carrier = next,
                None => {
                    debug!(function = %invocation.name, "Chain ended without a value");
                    return Ok(None);
                }
            }
        }

        Ok(match carrier.stringify() {
            Some(text) => Some(text),
            None if canonical => None,
            None => Some(String::new()),
        })
    }
}

/// Moves settled spans past a substitution of `replaced` by `len` bytes of
/// new text. Spans overlapping the substitution are dropped.
fn shift_settled(settled: Vec<Range<usize>>, replaced: &Range<usize>, len: usize) -> Vec<Range<usize>> {
    settled
        .into_iter()
        .filter_map(|span| {
            if span.end <= replaced.start {
                Some(span)
            } else if span.start >= replaced.end {
                let start = span.start - replaced.end + replaced.start + len;
                Some(start..start + span.len())
            } else {
                None
            }
        })
        .collect()
}
