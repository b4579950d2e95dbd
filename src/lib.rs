pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod query;
pub mod value;
pub mod cli;

pub use ast::{BinOp, FieldPath, Method, Node, Segment, Token, TokenType};
pub use evaluator::{EvalError, Evaluated, Outcome, Sequence};
pub use lexer::{LexError, Lexer, Position, tokenize};
pub use parser::{ParseError, Parser};
pub use query::{ErrorPolicy, FilterError, Query};
pub use value::{Key, Mapping, Value};

/// Compile a query string into a reusable [`Query`].
///
/// ```
/// use sift_lang::{compile, Value};
///
/// let query = compile("len(meaning) > 3").unwrap();
/// assert!(query.is_match(&Value::object([("meaning", Value::from("to run"))])).unwrap());
/// ```
pub fn compile(expression: &str) -> Result<Query, ParseError> {
    Query::compile(expression)
}
