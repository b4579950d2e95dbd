//! # Sift Query Language - Expression Tree
//!
//! This module defines the tokens and the expression tree of the sift query
//! language, a small filter language for dictionary-style vocabulary records.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens and the token-type transition table
//! - **[path]** - Field paths (`key[key][key]`) and their segments
//! - **[operators]** - Unary/binary operators, keywords and methods
//! - **[expressions]** - Expression tree nodes
//!
//! ## Quick Start
//!
//! ```text
//! "^to " in meaning and len(senses) > 1
//! ```
//!
//! This query keeps entries whose meaning contains a match for `^to ` and
//! that have more than one sense.
//!
//! ## Core Concepts
//!
//! ### Field Paths
//!
//! A bare word is a path into the record. Brackets descend:
//!
//! ```text
//! pos[noun][data]
//! ```
//!
//! Special segments:
//!
//! - **`$ANY`** - fan out over every value at this level
//! - **`$SELF`** - the key set of this level
//! - **`d_$N`** - numeric key or sequence index (`senses[d_$0]`)
//!
//! A bare decimal (`3`, `-0.5`) is a number; `f_$3` forces a field named `3`.
//!
//! ### Broadcasting
//!
//! Operators applied to sequences work item by item; two sequences combine
//! through their Cartesian product:
//!
//! ```text
//! pos[$ANY][data] > 1        // one boolean per part of speech
//! ```
//!
//! ### Methods
//!
//! `len`, `split`, `any`, `all`, `lower`, `upper`, `reduce`, `print`:
//!
//! ```text
//! any(lower(tags) == "slang")
//! ```
pub mod tokens;
pub mod path;
pub mod expressions;
pub mod operators;

pub use tokens::{Token, TokenType};
pub use path::{FieldPath, PathError, Segment};
pub use expressions::{Node, Operand};
pub use operators::{BinOp, Keyword, Method, Precedence, UnaryOp};
