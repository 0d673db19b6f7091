//! Host-facing state threaded through parsing and evaluation.
//!
//! Nothing here is global: the evaluator builds an [`EvalContext`] for each
//! call and hands it down to the builder and to every operation.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::warn;

use crate::ast::TypeKeyword;
use crate::value::DataValue;

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delimiter for lists and argument splitting
    pub delimiter: char,
    /// Upper bound on re-evaluation passes for one `process()` call
    pub max_passes: usize,
    /// Read a seed from disk when it names an existing file
    pub resolve_files: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            delimiter: ',',
            max_passes: 1024,
            resolve_files: false,
        }
    }
}

impl EngineConfig {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_resolve_files(mut self, resolve_files: bool) -> Self {
        self.resolve_files = resolve_files;
        self
    }
}

/// A value held in the host's named-value store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// A typed snapshot written by `store(var)`
    Data(DataValue),
    /// Plain text set by the host
    Text(String),
    /// An ordered collection set by the host
    Array(Vec<String>),
}

/// Named-value store owned by the host. Last writer wins.
pub trait ValueStore {
    fn get(&self, name: &str) -> Option<&StoredValue>;

    fn set(&mut self, name: &str, value: StoredValue);

    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// In-memory [`ValueStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ValueStore for MemoryStore {
    fn get(&self, name: &str) -> Option<&StoredValue> {
        self.values.get(name)
    }

    fn set(&mut self, name: &str, value: StoredValue) {
        self.values.insert(name.to_string(), value);
    }
}

/// Content-resolution policy applied to literal seeds.
pub trait ContentResolver {
    fn resolve(&self, raw: &str) -> Result<String, String>;
}

/// Uses seeds as written.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralContent;

impl ContentResolver for LiteralContent {
    fn resolve(&self, raw: &str) -> Result<String, String> {
        Ok(raw.to_string())
    }
}

/// Replaces a seed naming an existing file with that file's contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileContent;

impl ContentResolver for FileContent {
    fn resolve(&self, raw: &str) -> Result<String, String> {
        let candidate = raw.trim();
        if candidate.is_empty() || candidate.contains('\n') || !Path::new(candidate).is_file() {
            return Ok(raw.to_string());
        }
        std::fs::read_to_string(candidate)
            .map_err(|e| format!("Cannot read '{}': {}", candidate, e))
    }
}

/// What a collaborator hands back for an external seed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPayload {
    pub data: serde_json::Value,
    pub error: Option<String>,
}

/// Host service behind the `SQL`, `EXCEL` and `WEB` keywords.
///
/// Implementations may block (network, database). A failure of the remote
/// side is reported through [`ExternalPayload::error`]; returning `Err`
/// means the seed itself was unusable.
pub trait Collaborator {
    fn fetch(&self, keyword: TypeKeyword, seed: &str) -> Result<ExternalPayload, String>;
}

/// Collaborators registered by keyword.
#[derive(Default)]
pub struct Collaborators {
    entries: HashMap<TypeKeyword, Box<dyn Collaborator>>,
}

impl Collaborators {
    /// Only `SQL`, `EXCEL` and `WEB` take a collaborator; other keywords
    /// are ignored.
    pub fn register(&mut self, keyword: TypeKeyword, collaborator: Box<dyn Collaborator>) {
        if !keyword.is_external() {
            warn!(%keyword, "Ignoring collaborator for a built-in type");
            return;
        }
        self.entries.insert(keyword, collaborator);
    }

    pub fn get(&self, keyword: TypeKeyword) -> Option<&dyn Collaborator> {
        self.entries.get(&keyword).map(|c| c.as_ref())
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Everything an operation or the builder may consult.
pub struct EvalContext<'a> {
    pub store: &'a mut dyn ValueStore,
    pub config: &'a EngineConfig,
    pub resolver: &'a dyn ContentResolver,
    pub collaborators: &'a Collaborators,
}

impl EvalContext<'_> {
    pub fn delimiter(&self) -> char {
        self.config.delimiter
    }
}
