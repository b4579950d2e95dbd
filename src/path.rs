use crate::{
    ast::{FieldPath, Segment},
    value::{Key, Value},
};

/// Results gathered from the branches of a fan-out.
///
/// One branch yields its result unwrapped; a second branch turns the
/// accumulator into a list, later branches append to it.
enum Fanout {
    Empty,
    One(Value),
    Many(Vec<Value>),
}

impl Fanout {
    fn push(self, result: Option<Value>) -> Self {
        let Some(result) = result else {
            return self;
        };
        match self {
            Fanout::Empty => Fanout::One(result),
            Fanout::One(first) => Fanout::Many(vec![first, result]),
            Fanout::Many(mut items) => {
                items.push(result);
                Fanout::Many(items)
            }
        }
    }

    fn finish(self) -> Option<Value> {
        match self {
            Fanout::Empty => None,
            Fanout::One(value) => Some(value),
            Fanout::Many(items) => Some(Value::Array(items)),
        }
    }
}

/// Keys of a mapping, or the indices of a sequence.
fn key_set(value: &Value) -> Option<Value> {
    match value {
        Value::Object(map) => Some(Value::Array(map.keys().map(Key::to_value).collect())),
        Value::Array(items) => Some(Value::Array(
            (0..items.len() as i64).map(Value::Integer).collect(),
        )),
        _ => None,
    }
}

fn index_sequence(items: &[Value], index: i64) -> Option<&Value> {
    let index = if index < 0 {
        let from_end = index.unsigned_abs() as usize;
        items.len().checked_sub(from_end)?
    } else {
        index as usize
    };
    items.get(index)
}

impl FieldPath {
    /// Resolve the path against a record.
    ///
    /// Returns `None` when every branch was pruned (missing keys are not
    /// errors). A path ending on a mapping yields the mapping's key set.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_lang::{FieldPath, Value};
    ///
    /// let record = Value::object([(
    ///     "pos",
    ///     Value::object([
    ///         ("noun", Value::object([("data", Value::from(1))])),
    ///         ("verb", Value::object([("data", Value::from(2))])),
    ///     ]),
    /// )]);
    ///
    /// let path = FieldPath::parse("pos[$ANY][data]").unwrap();
    /// assert_eq!(
    ///     path.resolve(&record),
    ///     Some(Value::Array(vec![Value::from(1), Value::from(2)]))
    /// );
    /// ```
    pub fn resolve(&self, record: &Value) -> Option<Value> {
        resolve_at(self.segments(), record)
    }
}

fn resolve_at(segments: &[Segment], current: &Value) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return match current {
            Value::Object(_) => key_set(current),
            _ => Some(current.clone()),
        };
    };

    match (segment, current) {
        (Segment::Key(key), Value::Object(map)) => {
            let child = map.get(&Key::String(key.clone()));
            if child.is_none() {
                tracing::trace!(key = %key, "pruned branch: missing key");
            }
            resolve_at(rest, child?)
        }
        (Segment::Numeric { index: Some(i), .. }, Value::Array(items)) => {
            resolve_at(rest, index_sequence(items, *i)?)
        }
        (Segment::Numeric { key, .. }, Value::Object(map)) => {
            resolve_at(rest, map.get(&Key::Float(*key))?)
        }
        (Segment::Any, Value::Object(map)) => map
            .values()
            .fold(Fanout::Empty, |acc, child| acc.push(resolve_at(rest, child)))
            .finish(),
        (Segment::Any, Value::Array(items)) => items
            .iter()
            .fold(Fanout::Empty, |acc, child| acc.push(resolve_at(rest, child)))
            .finish(),
        (Segment::SelfRef, Value::Object(_) | Value::Array(_)) => {
            let acc = Fanout::Empty.push(key_set(current));
            if rest.is_empty() {
                acc.finish()
            } else {
                acc.push(resolve_at(rest, current)).finish()
            }
        }
        _ => None,
    }
}
