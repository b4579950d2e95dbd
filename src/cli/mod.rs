//! CLI support for sift-lang
//!
//! Provides programmatic access to the `sift` command so other tools can
//! run queries over JSON without going through a shell.

mod check;
mod convert;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{json_to_value, value_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Filter(#[from] crate::FilterError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input, --file or pipe JSON to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'sift docs' to see available categories.")]
    UnknownCategory(String),
}
