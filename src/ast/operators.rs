use std::fmt;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation (`not`)
    Not,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "not" => Some(UnaryOp::Not),
            _ => None,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Logical
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,
}

/// Binding strength of binary operators, tightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Comparison,
    And,
    Or,
}

impl Precedence {
    /// Tiers in the order the tree builder collapses them.
    pub const TIERS: [Precedence; 3] = [Precedence::Comparison, Precedence::And, Precedence::Or];
}

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" => Some(BinOp::Equal),
            "!=" => Some(BinOp::NotEqual),
            "<" => Some(BinOp::LessThan),
            ">" => Some(BinOp::GreaterThan),
            "<=" => Some(BinOp::LessEqual),
            ">=" => Some(BinOp::GreaterEqual),
            "and" => Some(BinOp::And),
            "or" => Some(BinOp::Or),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    pub fn precedence(self) -> Precedence {
        match self {
            BinOp::And => Precedence::And,
            BinOp::Or => Precedence::Or,
            _ => Precedence::Comparison,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Keywords joining a pattern and a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Pattern search (`"^to " in meaning`)
    In,
}

impl Keyword {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "in" => Some(Keyword::In),
            _ => None,
        }
    }
}

/// Built-in methods, called as `name(expr)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Size of a string, sequence or mapping
    Len,
    /// Whitespace split of strings
    Split,
    /// Any item truthy
    Any,
    /// All items truthy
    All,
    Lower,
    Upper,
    /// Flatten one level of nesting
    Reduce,
    /// Abort evaluation and surface the operand's value
    Print,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "len" => Some(Method::Len),
            "split" => Some(Method::Split),
            "any" => Some(Method::Any),
            "all" => Some(Method::All),
            "lower" => Some(Method::Lower),
            "upper" => Some(Method::Upper),
            "reduce" => Some(Method::Reduce),
            "print" => Some(Method::Print),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Len => "len",
            Method::Split => "split",
            Method::Any => "any",
            Method::All => "all",
            Method::Lower => "lower",
            Method::Upper => "upper",
            Method::Reduce => "reduce",
            Method::Print => "print",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
