use regex::Regex;

use crate::{
    ast::{BinOp, FieldPath, Keyword, Method, Token, UnaryOp},
    value::Value,
};

/// Leaf value of an expression: a numeric constant or a field path.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Decimal literal
    ///
    /// # Example
    /// ```text
    /// 3
    /// -0.5
    /// ```
    Number(Value),

    /// Field path resolved against the record
    ///
    /// # Example
    /// ```text
    /// pos[$ANY][data]
    /// f_$42
    /// ```
    Path(FieldPath),
}

/// Node of a compiled expression tree.
///
/// Trees are built once per query and are immutable afterwards; every node
/// keeps the token it was built from for diagnostics.
#[derive(Debug, Clone)]
pub enum Node {
    /// Field path or literal
    Operand { operand: Operand, token: Token },

    /// Method call
    ///
    /// # Examples
    /// ```text
    /// len(meaning)
    /// reduce(senses[$ANY][examples])
    /// ```
    Method {
        method: Method,
        argument: Box<Node>,
        token: Token,
    },

    /// Unary operation
    ///
    /// # Example
    /// ```text
    /// not tags[archaic]
    /// ```
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
        token: Token,
    },

    /// Binary operation (comparison, logical)
    Binary {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
        token: Token,
    },

    /// Keyword expression; the pattern is compiled once at build time
    ///
    /// # Example
    /// ```text
    /// "^run" in forms
    /// ```
    Keyword {
        keyword: Keyword,
        pattern: Regex,
        field: Operand,
        token: Token,
    },
}

impl Node {
    /// The token this node was built from.
    pub fn token(&self) -> &Token {
        match self {
            Node::Operand { token, .. }
            | Node::Method { token, .. }
            | Node::Unary { token, .. }
            | Node::Binary { token, .. }
            | Node::Keyword { token, .. } => token,
        }
    }
}
