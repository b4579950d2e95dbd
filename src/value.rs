use std::fmt;

/// A mapping key inside a record.
///
/// Vocabulary records mostly use string keys, but numbered senses and
/// similar sub-tables may be keyed by numbers. Numeric keys compare equal
/// across representations, so `Key::Integer(1) == Key::Float(1.0)`.
#[derive(Debug, Clone)]
pub enum Key {
    String(String),
    Integer(i64),
    Float(f64),
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::String(a), Key::String(b)) => a == b,
            (Key::Integer(a), Key::Integer(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a == b,
            (Key::Integer(a), Key::Float(b)) | (Key::Float(b), Key::Integer(a)) => *a as f64 == *b,
            _ => false,
        }
    }
}

impl Key {
    /// The key as a plain value, as it appears in key sets.
    pub fn to_value(&self) -> Value {
        match self {
            Key::String(s) => Value::String(s.clone()),
            Key::Integer(n) => Value::Integer(*n),
            Key::Float(n) => Value::Float(*n),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::String(s) => f.write_str(s),
            Key::Integer(n) => write!(f, "{}", n),
            Key::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Integer(n)
    }
}

impl From<f64> for Key {
    fn from(n: f64) -> Self {
        Key::Float(n)
    }
}

/// An insertion-ordered mapping.
///
/// Records are small (one dictionary entry each), so lookups scan the
/// entries. Order matters: wildcard fan-out and key sets follow it.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<(Key, Value)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing (in place) any entry with an equal key.
    pub fn insert(&mut self, key: impl Into<Key>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mappings are equal when they hold the same keys with equal values,
/// regardless of order.
impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl<K: Into<Key>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Mapping {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A record value: the hierarchical data a query is evaluated against.
///
/// Records are mappings of mappings, sequences and scalars, e.g. a
/// vocabulary entry with its parts of speech, senses and examples.
///
/// # Examples
///
/// ```
/// use sift_lang::Value;
///
/// let entry = Value::object([
///     ("word", Value::from("run")),
///     ("tags", Value::from(vec![Value::from("verb"), Value::from("noun")])),
/// ]);
/// assert_eq!(entry.type_name(), "mapping");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,

    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// Mapping from keys to values
    Object(Mapping),
}

impl Value {
    /// Build a mapping value from key/value pairs.
    pub fn object<K: Into<Key>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(pairs.into_iter().collect())
    }

    /// Truthiness used by `not`, `and`, `or`, `any` and `all`.
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0,
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Array(arr) => !arr.is_empty(),
            Object(obj) => !obj.is_empty(),
        }
    }

    /// Numeric view of the value. Booleans count as 0 and 1.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "sequence",
            Value::Object(_) => "mapping",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Object(map)
    }
}
