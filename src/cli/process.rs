//! Resolve expressions in a text

use crate::context::EngineConfig;
use crate::Evaluator;

use super::{CliError, load_vars, parse_var, text};

/// Options for the process command
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Text containing bracket expressions
    pub text: Option<String>,
    /// Engine settings
    pub config: EngineConfig,
    /// `name=value` pairs stored as `TEXT` values before evaluation
    pub vars: Vec<String>,
    /// Contents of a JSON variables file
    pub vars_json: Option<String>,
    /// Only recognise the first expression to resolve and build its seed
    pub syntax_only: bool,
}

/// Result of a process operation
#[derive(Debug, PartialEq)]
pub enum ProcessResult {
    /// Syntax check found an expression; holds its canonical form
    SyntaxValid(String),
    /// Syntax check found nothing to evaluate
    NoExpression,
    /// Fully resolved text
    Output(String),
}

/// Execute a typeflow process operation
pub fn execute_process(options: &ProcessOptions) -> Result<ProcessResult, CliError> {
    let input = options.text.as_ref().ok_or(CliError::NoInput)?;

    let mut evaluator = Evaluator::with_config(options.config.clone());

    if let Some(json) = &options.vars_json {
        for (name, value) in load_vars(json)? {
            evaluator.store_mut().set(&name, value);
        }
    }
    for raw in &options.vars {
        let (name, value) = parse_var(raw)?;
        evaluator.store_mut().set(&name, text(value));
    }

    if options.syntax_only {
        return Ok(match evaluator.parse(input, true)? {
            Some(expression) => ProcessResult::SyntaxValid(expression.canonical()),
            None => ProcessResult::NoExpression,
        });
    }

    Ok(ProcessResult::Output(evaluator.process(input)?))
}
