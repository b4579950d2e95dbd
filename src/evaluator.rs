use std::{cmp::Ordering, fmt, iter, rc::Rc};

use regex::Regex;

use crate::{
    ast::{BinOp, Keyword, Method, Node, Operand, Token, UnaryOp},
    lexer::Position,
    value::{Key, Value},
};

/// Errors that can occur while evaluating a compiled query against a record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// A method, keyword or operator received an operand of the wrong shape
    #[error("argument type error in '{token}' at {position}: {message}")]
    ArgumentType {
        message: String,
        token: String,
        position: Position,
    },
}

impl EvalError {
    pub fn position(&self) -> Position {
        match self {
            EvalError::ArgumentType { position, .. } => *position,
        }
    }
}

/// Token an evaluation error is reported against.
#[derive(Debug, Clone)]
struct Site {
    token: String,
    position: Position,
}

impl Site {
    fn of(token: &Token) -> Self {
        Site {
            token: token.value().to_string(),
            position: token.position(),
        }
    }

    fn argument_type(&self, message: impl Into<String>) -> EvalError {
        EvalError::ArgumentType {
            message: message.into(),
            token: self.token.clone(),
            position: self.position,
        }
    }
}

/// A lazy, one-shot sequence of results.
///
/// Items are produced on demand and may fail (e.g. `split` meeting a
/// number). Once consumed it is gone; evaluate the query again for a
/// fresh one.
pub struct Sequence {
    items: Box<dyn Iterator<Item = Result<Evaluated, EvalError>>>,
}

impl Sequence {
    pub fn new(items: impl Iterator<Item = Result<Evaluated, EvalError>> + 'static) -> Self {
        Sequence {
            items: Box::new(items),
        }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self::new(values.into_iter().map(|v| Ok(Evaluated::Value(v))))
    }
}

impl Iterator for Sequence {
    type Item = Result<Evaluated, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sequence(..)")
    }
}

/// Result of evaluating a node: a plain value or a lazy sequence.
#[derive(Debug)]
pub enum Evaluated {
    Value(Value),
    Sequence(Sequence),
}

impl From<Value> for Evaluated {
    fn from(value: Value) -> Self {
        Evaluated::Value(value)
    }
}

impl Evaluated {
    /// Sequences, arrays and mappings broadcast; everything else is scalar.
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            Evaluated::Sequence(_) | Evaluated::Value(Value::Array(_) | Value::Object(_))
        )
    }

    /// Items of a sequence-like result (a mapping yields its keys), or the
    /// scalar back.
    pub fn into_items(self) -> Result<Sequence, Value> {
        match self {
            Evaluated::Sequence(items) => Ok(items),
            Evaluated::Value(Value::Array(items)) => Ok(Sequence::from_values(items)),
            Evaluated::Value(Value::Object(map)) => {
                Ok(Sequence::from_values(map.keys().map(Key::to_value).collect()))
            }
            Evaluated::Value(scalar) => Err(scalar),
        }
    }

    /// Consume lazy parts and return a plain value.
    pub fn into_value(self) -> Result<Value, EvalError> {
        match self {
            Evaluated::Value(value) => Ok(value),
            Evaluated::Sequence(items) => collect_values(items).map(Value::Array),
        }
    }

    /// Truthiness. A lazy sequence is truthy when it yields anything.
    pub fn is_truthy(self) -> Result<bool, EvalError> {
        match self {
            Evaluated::Value(value) => Ok(value.is_truthy()),
            Evaluated::Sequence(mut items) => items.next().transpose().map(|first| first.is_some()),
        }
    }

    /// Coercion used when filtering: a sequence matches when any of its
    /// items does, a scalar when it is truthy.
    pub fn is_match(self) -> Result<bool, EvalError> {
        match self.into_items() {
            Ok(items) => {
                for item in items {
                    if item?.is_match()? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Err(scalar) => Ok(scalar.is_truthy()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Evaluated::Value(value) => value.type_name(),
            Evaluated::Sequence(_) => "sequence",
        }
    }
}

fn collect_values(items: Sequence) -> Result<Vec<Value>, EvalError> {
    items
        .map(|item| item.and_then(Evaluated::into_value))
        .collect()
}

/// What computing a query against one record produced.
#[derive(Debug)]
pub enum Outcome {
    /// Normal result
    Value(Evaluated),

    /// `print(...)` was reached; carries the value of its operand
    Print(Value),

    /// Evaluation failed for this record
    Failure(EvalError),
}

impl Outcome {
    pub fn value(self) -> Option<Evaluated> {
        match self {
            Outcome::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn printed(self) -> Option<Value> {
        match self {
            Outcome::Print(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&EvalError> {
        match self {
            Outcome::Failure(error) => Some(error),
            _ => None,
        }
    }
}

/// Early exit from a computation.
enum Interrupt {
    Print(Value),
    Failure(EvalError),
}

impl From<EvalError> for Interrupt {
    fn from(error: EvalError) -> Self {
        Interrupt::Failure(error)
    }
}

impl Node {
    /// Evaluate the tree rooted at this node against a record.
    pub fn compute(&self, record: &Value) -> Outcome {
        match self.eval(record) {
            Ok(value) => Outcome::Value(value),
            Err(Interrupt::Print(value)) => Outcome::Print(value),
            Err(Interrupt::Failure(error)) => Outcome::Failure(error),
        }
    }

    fn eval(&self, record: &Value) -> Result<Evaluated, Interrupt> {
        match self {
            Node::Operand { operand, .. } => Ok(eval_operand(operand, record)),
            Node::Method {
                method,
                argument,
                token,
            } => {
                let argument = argument.eval(record)?;
                apply_method(*method, argument, &Site::of(token))
            }
            Node::Unary {
                op: UnaryOp::Not,
                operand,
                ..
            } => Ok(negate(operand.eval(record)?)),
            Node::Binary {
                op,
                left,
                right,
                token,
            } => {
                let left = left.eval(record)?;
                let right = right.eval(record)?;
                Ok(broadcast(*op, left, right, Site::of(token))?)
            }
            Node::Keyword {
                keyword: Keyword::In,
                pattern,
                field,
                token,
            } => {
                let value = eval_operand(field, record);
                Ok(keyword_in(pattern, value, &Site::of(token))?)
            }
        }
    }
}

fn eval_operand(operand: &Operand, record: &Value) -> Evaluated {
    match operand {
        Operand::Number(n) => Evaluated::Value(n.clone()),
        Operand::Path(path) => Evaluated::Value(path.resolve(record).unwrap_or(Value::Null)),
    }
}

// ========================================
// Logic and comparison operators
// ========================================

fn negate_item(item: Result<Evaluated, EvalError>) -> Result<Evaluated, EvalError> {
    let truthy = item?.is_truthy()?;
    Ok(Evaluated::Value(Value::Boolean(!truthy)))
}

/// `not`: elementwise over sequences.
fn negate(operand: Evaluated) -> Evaluated {
    match operand.into_items() {
        Ok(items) => Evaluated::Sequence(Sequence::new(items.map(negate_item))),
        Err(scalar) => Evaluated::Value(Value::Boolean(!scalar.is_truthy())),
    }
}

/// Which side of the operator a broadcast scalar sits on.
#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Apply a binary operator, broadcasting over sequences.
///
/// A scalar is paired with every item of a sequence; two sequences pair
/// through their Cartesian product (left-major).
fn broadcast(op: BinOp, left: Evaluated, right: Evaluated, site: Site) -> Result<Evaluated, EvalError> {
    match (left.into_items(), right.into_items()) {
        (Err(a), Err(b)) => Ok(Evaluated::Value(apply_binary(op, &a, &b, &site)?)),
        (Ok(items), Err(scalar)) => Ok(broadcast_scalar(op, items, scalar, Side::Right, site)),
        (Err(scalar), Ok(items)) => Ok(broadcast_scalar(op, items, scalar, Side::Left, site)),
        (Ok(left), Ok(right)) => {
            let left = collect_values(left)?;
            let right = Rc::new(collect_values(right)?);
            let product = left.into_iter().flat_map(move |a| {
                let right = Rc::clone(&right);
                let site = site.clone();
                (0..right.len()).map(move |j| {
                    apply_binary(op, &a, &right[j], &site).map(Evaluated::Value)
                })
            });
            Ok(Evaluated::Sequence(Sequence::new(product)))
        }
    }
}

fn broadcast_scalar(op: BinOp, items: Sequence, scalar: Value, side: Side, site: Site) -> Evaluated {
    // `x or <true>` and `x and <false>` do not depend on x
    let settled = match op {
        BinOp::Or if scalar.is_truthy() => Some(true),
        BinOp::And if !scalar.is_truthy() => Some(false),
        _ => None,
    };

    let results = items.map(move |item| -> Result<Evaluated, EvalError> {
        let item = item?;
        if let Some(result) = settled {
            return Ok(Evaluated::Value(Value::Boolean(result)));
        }
        let item = item.into_value()?;
        let value = match side {
            Side::Left => apply_binary(op, &scalar, &item, &site)?,
            Side::Right => apply_binary(op, &item, &scalar, &site)?,
        };
        Ok(Evaluated::Value(value))
    });
    Evaluated::Sequence(Sequence::new(results))
}

fn apply_binary(op: BinOp, left: &Value, right: &Value, site: &Site) -> Result<Value, EvalError> {
    match op {
        BinOp::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        BinOp::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
        BinOp::Equal => Ok(Value::Boolean(values_equal(left, right))),
        BinOp::NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
        BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => {
            let ordering = compare_values(left, right).ok_or_else(|| {
                site.argument_type(format!(
                    "cannot compare {} {} {}",
                    left.type_name(),
                    op,
                    right.type_name()
                ))
            })?;
            let holds = match op {
                BinOp::LessThan => ordering.is_lt(),
                BinOp::GreaterThan => ordering.is_gt(),
                BinOp::LessEqual => ordering.is_le(),
                _ => ordering.is_ge(),
            };
            Ok(Value::Boolean(holds))
        }
    }
}

/// Equality with numbers compared by value across integer, float and
/// boolean.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => a == b,
            _ => left == right,
        },
    }
}

/// Ordering for numbers, strings and (lexicographically) sequences.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b) {
                match compare_values(x, y)? {
                    Ordering::Equal => continue,
                    other => return Some(other),
                }
            }
            Some(a.len().cmp(&b.len()))
        }
        _ => left.as_float()?.partial_cmp(&right.as_float()?),
    }
}

// ========================================
// Keywords
// ========================================

/// `PATTERN in FIELD`
fn keyword_in(pattern: &Regex, value: Evaluated, site: &Site) -> Result<Evaluated, EvalError> {
    let found = match value.into_items() {
        Err(Value::String(s)) => pattern.is_match(&s),
        Err(Value::Null) => false,
        Err(other) => {
            return Err(site.argument_type(format!(
                "'in' requires a string or a sequence of strings, got {}",
                other.type_name()
            )));
        }
        Ok(items) => {
            let mut texts = Vec::new();
            for item in items {
                match item?.into_value()? {
                    Value::String(s) => texts.push(s),
                    other => {
                        return Err(site.argument_type(format!(
                            "'in' requires every item to be a string, got {}",
                            other.type_name()
                        )));
                    }
                }
            }
            texts.iter().any(|s| pattern.is_match(s))
        }
    };
    Ok(Evaluated::Value(Value::Boolean(found)))
}

// ========================================
// Methods
// ========================================

/// Dispatch method calls to their implementations
fn apply_method(method: Method, argument: Evaluated, site: &Site) -> Result<Evaluated, Interrupt> {
    let result = match method {
        Method::Len => method_len(argument),
        Method::Split => method_strings(argument, site, method, split_words),
        Method::Lower => method_strings(argument, site, method, |s| Value::String(s.to_lowercase())),
        Method::Upper => method_strings(argument, site, method, |s| Value::String(s.to_uppercase())),
        Method::Any => method_any(argument, site),
        Method::All => method_all(argument, site),
        Method::Reduce => method_reduce(argument, site),
        Method::Print => return Err(Interrupt::Print(argument.into_value()?)),
    };
    Ok(result?)
}

/// len() - size of strings, sequences and mappings; 0 for anything else
fn method_len(argument: Evaluated) -> Result<Evaluated, EvalError> {
    let len = match argument {
        Evaluated::Value(Value::String(s)) => s.chars().count(),
        Evaluated::Value(Value::Array(items)) => items.len(),
        Evaluated::Value(Value::Object(map)) => map.len(),
        Evaluated::Sequence(items) => {
            let mut count = 0;
            for item in items {
                item?;
                count += 1;
            }
            count
        }
        Evaluated::Value(_) => 0,
    };
    Ok(Evaluated::Value(Value::Integer(len as i64)))
}

fn split_words(s: &str) -> Value {
    Value::Array(s.split_whitespace().map(Value::from).collect())
}

/// split(), lower(), upper() - apply to a string, or to every string of a
/// sequence
fn method_strings(
    argument: Evaluated,
    site: &Site,
    method: Method,
    apply: fn(&str) -> Value,
) -> Result<Evaluated, EvalError> {
    match argument.into_items() {
        Err(Value::String(s)) => Ok(Evaluated::Value(apply(&s))),
        Err(other) => Err(site.argument_type(format!(
            "{}() requires a string or a sequence of strings, got {}",
            method,
            other.type_name()
        ))),
        Ok(items) => {
            let site = site.clone();
            let results = items.map(move |item| -> Result<Evaluated, EvalError> {
                match item?.into_value()? {
                    Value::String(s) => Ok(Evaluated::Value(apply(&s))),
                    other => Err(site.argument_type(format!(
                        "{}() requires strings, got {}",
                        method,
                        other.type_name()
                    ))),
                }
            });
            Ok(Evaluated::Sequence(Sequence::new(results)))
        }
    }
}

/// any() - true if any item is truthy
fn method_any(argument: Evaluated, site: &Site) -> Result<Evaluated, EvalError> {
    let result = match argument.into_items() {
        Ok(items) => {
            let mut found = false;
            for item in items {
                if item?.is_truthy()? {
                    found = true;
                    break;
                }
            }
            found
        }
        Err(Value::String(s)) => !s.is_empty(),
        Err(other) => {
            return Err(site.argument_type(format!(
                "any() requires a sequence, got {}",
                other.type_name()
            )));
        }
    };
    Ok(Evaluated::Value(Value::Boolean(result)))
}

/// all() - true if every item is truthy
fn method_all(argument: Evaluated, site: &Site) -> Result<Evaluated, EvalError> {
    let result = match argument.into_items() {
        Ok(items) => {
            let mut all = true;
            for item in items {
                if !item?.is_truthy()? {
                    all = false;
                    break;
                }
            }
            all
        }
        Err(Value::String(_)) => true,
        Err(other) => {
            return Err(site.argument_type(format!(
                "all() requires a sequence, got {}",
                other.type_name()
            )));
        }
    };
    Ok(Evaluated::Value(Value::Boolean(result)))
}

/// reduce() - flattens exactly one level of nesting
fn method_reduce(argument: Evaluated, site: &Site) -> Result<Evaluated, EvalError> {
    let items = argument.into_items().map_err(|other| {
        site.argument_type(format!(
            "reduce() requires a sequence, got {}",
            other.type_name()
        ))
    })?;

    let site = site.clone();
    let flattened = items.flat_map(
        move |item| -> Box<dyn Iterator<Item = Result<Evaluated, EvalError>>> {
            let item = match item {
                Ok(item) => item,
                Err(e) => return Box::new(iter::once(Err(e))),
            };
            match item.into_items() {
                Ok(inner) => Box::new(inner),
                Err(other) => Box::new(iter::once(Err(site.argument_type(format!(
                    "reduce() requires every item to be a sequence, got {}",
                    other.type_name()
                ))))),
            }
        },
    );
    Ok(Evaluated::Sequence(Sequence::new(flattened)))
}
