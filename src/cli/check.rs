//! Run sift queries against JSON input

use super::{CliError, json_to_value, value_to_json};
use crate::{ErrorPolicy, FilterError, Outcome, Query, Value};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The sift query to run
    pub query: String,
    /// JSON input: an array of records, or a single record
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    /// Report every record's result instead of filtering
    pub eval: bool,
    /// Leave out records that fail to evaluate instead of stopping
    pub skip_errors: bool,
}

impl CheckOptions {
    fn policy(&self) -> ErrorPolicy {
        if self.skip_errors {
            ErrorPolicy::SkipRecord
        } else {
            ErrorPolicy::FailFast
        }
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Records kept by the query, as a JSON array
    Matches(serde_json::Value),
    /// One result per record, as a JSON array (`null` for skipped failures)
    Results(serde_json::Value),
    /// `print(...)` was reached while processing record `index`
    Printed {
        index: usize,
        value: serde_json::Value,
    },
}

/// Split JSON input into records. A top-level array is a collection of
/// records; anything else is a single record.
fn read_records(input: &str) -> Result<Vec<Value>, CliError> {
    let json: serde_json::Value = serde_json::from_str(input)?;
    Ok(match json {
        serde_json::Value::Array(items) => items.into_iter().map(json_to_value).collect(),
        single => vec![json_to_value(single)],
    })
}

/// Execute a sift check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query = Query::compile(&options.query)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let records = read_records(input)?;
    tracing::info!(records = records.len(), "running query");

    if options.eval {
        return evaluate_all(&query, &records, options.policy());
    }

    match query.filter(&records, options.policy()) {
        Ok(kept) => Ok(CheckResult::Matches(serde_json::Value::Array(
            kept.into_iter().cloned().map(value_to_json).collect(),
        ))),
        Err(FilterError::Print { index, value }) => Ok(CheckResult::Printed {
            index,
            value: value_to_json(value),
        }),
        Err(e) => Err(e.into()),
    }
}

fn evaluate_all(query: &Query, records: &[Value], policy: ErrorPolicy) -> Result<CheckResult, CliError> {
    let mut results = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let result = match query.evaluate(record) {
            Outcome::Value(value) => value.into_value(),
            Outcome::Print(value) => {
                return Ok(CheckResult::Printed {
                    index,
                    value: value_to_json(value),
                });
            }
            Outcome::Failure(e) => Err(e),
        };
        match result {
            Ok(value) => results.push(value_to_json(value)),
            Err(e) if policy == ErrorPolicy::SkipRecord => {
                tracing::debug!(index, error = %e, "skipping record");
                results.push(serde_json::Value::Null);
            }
            Err(source) => return Err(FilterError::Eval { index, source }.into()),
        }
    }
    Ok(CheckResult::Results(serde_json::Value::Array(results)))
}
