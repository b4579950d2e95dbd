use crate::{
    ast::{Node, TokenType},
    evaluator::{EvalError, Evaluated, Outcome},
    lexer::tokenize,
    parser::{ParseError, Parser},
    value::Value,
};

/// What [`Query::filter`] does when a record fails to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failing record
    #[default]
    FailFast,

    /// Log the failure and leave the record out
    SkipRecord,
}

/// Errors raised while filtering a collection of records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("record {index}: {source}")]
    Eval { index: usize, source: EvalError },

    /// `print(...)` was reached; filtering stops with the printed value
    #[error("record {index}: print reached")]
    Print { index: usize, value: Value },
}

/// A compiled query.
///
/// Compiling is the expensive part; the tree is immutable afterwards and
/// can be evaluated against any number of records, from any thread.
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    root: Option<Node>,
}

impl Query {
    /// Compile a query string.
    #[tracing::instrument(level = "debug", err)]
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(source)?;
        tracing::debug!(tokens = tokens.len(), "tokenized query");

        if tokens.first().is_some_and(|t| t.kind() == TokenType::End) {
            tracing::debug!("empty query accepts every record");
            return Ok(Query {
                source: source.to_string(),
                root: None,
            });
        }

        let root = Parser::new(tokens).parse()?;
        tracing::debug!(root = %root.token().value(), "built expression tree");
        Ok(Query {
            source: source.to_string(),
            root: Some(root),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root of the expression tree; `None` for the empty query.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Evaluate the query against one record.
    pub fn evaluate(&self, record: &Value) -> Outcome {
        match &self.root {
            Some(root) => root.compute(record),
            None => Outcome::Value(Evaluated::Value(Value::Boolean(true))),
        }
    }

    /// The query as a plain predicate closure.
    pub fn predicate(&self) -> impl Fn(&Value) -> Outcome + '_ {
        move |record| self.evaluate(record)
    }

    /// Whether the record is kept by the query. A sequence result keeps the
    /// record when any of its items does.
    pub fn is_match(&self, record: &Value) -> Result<bool, FilterError> {
        self.check(0, record)
    }

    fn check(&self, index: usize, record: &Value) -> Result<bool, FilterError> {
        match self.evaluate(record) {
            Outcome::Value(result) => result
                .is_match()
                .map_err(|source| FilterError::Eval { index, source }),
            Outcome::Print(value) => Err(FilterError::Print { index, value }),
            Outcome::Failure(source) => Err(FilterError::Eval { index, source }),
        }
    }

    /// Keep the records the query matches, in order.
    pub fn filter<'a>(
        &self,
        records: &'a [Value],
        policy: ErrorPolicy,
    ) -> Result<Vec<&'a Value>, FilterError> {
        let mut kept = Vec::new();
        for (index, record) in records.iter().enumerate() {
            match self.check(index, record) {
                Ok(true) => kept.push(record),
                Ok(false) => {}
                Err(FilterError::Eval { index, source }) if policy == ErrorPolicy::SkipRecord => {
                    tracing::debug!(index, error = %source, "skipping record");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(kept)
    }
}
