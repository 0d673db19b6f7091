pub mod ast;
pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod context;
pub mod escape;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod path;
pub mod registry;
pub mod value;

pub use ast::{ChainToken, Expression, Invocation, TypeKeyword};
pub use context::{
    Collaborator, ContentResolver, EngineConfig, EvalContext, ExternalPayload, MemoryStore,
    StoredValue, ValueStore,
};
pub use evaluator::{EvalError, Evaluator};
pub use lexer::{LexError, Lexer};
pub use parser::Parser;
pub use registry::{Arity, Registry};
pub use value::{DataType, DataValue};
