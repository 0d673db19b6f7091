//! CLI support for typeflow
//!
//! Provides programmatic access to the typeflow commands so other tools can
//! embed them without spawning the binary.

mod convert;
mod docs;
mod onboard;
mod process;

pub use convert::{json_to_stored, load_vars, parse_var, text};
pub use docs::{DocCategory, get_doc_category, get_docs_overview, list_functions};
pub use onboard::get_onboarding_content;
pub use process::{ProcessOptions, ProcessResult, execute_process};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Evaluation error
    Eval(crate::EvalError),
    /// JSON parsing error (variables file)
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// `--var` not written as `name=value`
    InvalidVar(String),
    /// Unknown type keyword
    UnknownType(String),
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Eval(e) => write!(f, "Evaluation error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Pass the text as an argument or pipe it to stdin."),
            CliError::InvalidVar(v) => write!(f, "Invalid variable '{}': expected name=value", v),
            CliError::UnknownType(t) => {
                write!(f, "Unknown type: '{}'\nRun 'typeflow functions' to see all types.", t)
            }
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'typeflow docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Eval(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::EvalError> for CliError {
    fn from(e: crate::EvalError) -> Self {
        CliError::Eval(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
