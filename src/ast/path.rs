use std::fmt;

/// Prefix forcing a bracket key to be read as a number.
pub const NUMERIC_PREFIX: &str = "d_$";

/// One step of a field path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Mapping lookup by string key
    ///
    /// # Examples
    /// ```text
    /// meaning            // Key("meaning")
    /// pos[noun]          // Key("pos"), Key("noun")
    /// ```
    Key(String),

    /// Numeric key (`d_$` prefix)
    ///
    /// Indexes sequences when the number is an integer, otherwise (or on
    /// mappings) looks up the numeric key.
    ///
    /// # Examples
    /// ```text
    /// senses[d_$0]       // Numeric { index: Some(0), key: 0.0 }
    /// table[d_$1.5]      // Numeric { index: None, key: 1.5 }
    /// ```
    Numeric { index: Option<i64>, key: f64 },

    /// `$ANY`: every value at this level
    Any,

    /// `$SELF`: the key set of this level
    SelfRef,
}

impl Segment {
    fn parse(raw: &str, offset: usize) -> Result<Self, PathError> {
        match raw {
            "$ANY" => Ok(Segment::Any),
            "$SELF" => Ok(Segment::SelfRef),
            _ => match raw.strip_prefix(NUMERIC_PREFIX) {
                Some(rest) => {
                    let number = rest.trim();
                    let key = number.parse::<f64>().map_err(|_| {
                        PathError::new(
                            format!("expected a number after '{}', got '{}'", NUMERIC_PREFIX, rest),
                            offset,
                            raw.chars().count(),
                        )
                    })?;
                    Ok(Segment::Numeric {
                        index: number.parse::<i64>().ok(),
                        key,
                    })
                }
                None => Ok(Segment::Key(raw.to_string())),
            },
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Numeric { index: Some(i), .. } => write!(f, "{}{}", NUMERIC_PREFIX, i),
            Segment::Numeric { key, .. } => write!(f, "{}{}", NUMERIC_PREFIX, key),
            Segment::Any => f.write_str("$ANY"),
            Segment::SelfRef => f.write_str("$SELF"),
        }
    }
}

/// Malformed field path. Offsets are relative to the path text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct PathError {
    pub message: String,
    pub offset: usize,
    pub length: usize,
}

impl PathError {
    fn new(message: impl Into<String>, offset: usize, length: usize) -> Self {
        PathError {
            message: message.into(),
            offset,
            length,
        }
    }
}

/// A parsed `key1[key2][key3]` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Split path text into segments.
    ///
    /// Brackets may nest inside a key (`a[b[c]]` reads key `b[c]`), must
    /// balance, and only whitespace may follow the last `]`. An empty head
    /// (`[a][b]`) starts straight at the bracket keys.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let chars: Vec<char> = text.chars().collect();
        let mut segments = Vec::new();

        let head_end = chars.iter().position(|c| *c == '[').unwrap_or(chars.len());
        if let Some(offset) = chars[..head_end].iter().position(|c| *c == ']') {
            return Err(PathError::new(
                "unbalanced brackets: unexpected ']'",
                offset,
                1,
            ));
        }
        if head_end > 0 || head_end == chars.len() {
            let head: String = chars[..head_end].iter().collect();
            segments.push(Segment::parse(&head, 0)?);
        }

        let mut pos = head_end;
        while pos < chars.len() {
            if chars[pos] != '[' {
                if chars[pos..].iter().all(|c| c.is_whitespace()) {
                    break;
                }
                return Err(PathError::new(
                    "unexpected characters after ']'",
                    pos,
                    chars.len() - pos,
                ));
            }

            let open = pos;
            let mut depth = 0usize;
            let mut close = None;
            for (i, c) in chars.iter().enumerate().skip(open) {
                match c {
                    '[' => depth += 1,
                    ']' => {
                        depth -= 1;
                        if depth == 0 {
                            close = Some(i);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            let close = close.ok_or_else(|| {
                PathError::new(
                    "unbalanced brackets: '[' is never closed",
                    open,
                    chars.len() - open,
                )
            })?;

            let key: String = chars[open + 1..close].iter().collect();
            segments.push(Segment::parse(&key, open + 1)?);
            pos = close + 1;
        }

        Ok(FieldPath { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", segment)?;
            } else {
                write!(f, "[{}]", segment)?;
            }
        }
        Ok(())
    }
}
