//! # Typeflow - Syntax Tree
//!
//! Typeflow expressions live inside ordinary script text:
//!
//! ```text
//! [TYPE(initial value) => operation1(arg, arg) operation2 operation3(arg)]
//! ```
//!
//! The syntax tree is flat. There is no nesting inside an
//! expression: nested expressions are resolved innermost-first by the
//! evaluator, so by the time an expression is parsed its seed and arguments
//! are plain text.
//!
//! - **[keyword]** - The closed set of type keywords (`TEXT`, `LIST`, ...)
//! - **[tokens]** - Raw `name(params)` groups produced by the chain lexer
//! - **[invocation]** - A function name with its split, unescaped arguments
//! - **[expression]** - One recognised bracket expression
//!
//! ## Examples
//!
//! ```text
//! [TEXT(hello) => upper]                 // HELLO
//! [LIST(b,a,c) => ascending() first()]   // a
//! [NUMBER(2.50) => add(1.25)]            // 3.75
//! ```
pub mod expression;
pub mod invocation;
pub mod keyword;
pub mod tokens;

pub use expression::Expression;
pub use invocation::Invocation;
pub use keyword::TypeKeyword;
pub use tokens::ChainToken;
