use std::fmt;

use crate::lexer::{LexError, Position};

/// Lexical category of a token.
///
/// The category of a token is not a property of its text alone: `in`
/// right after `(` names a field, while after a field it is the keyword.
/// [`TokenType::successors`] is the transition table that decides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Virtual type preceding the first token
    Start,

    /// Keyword taking a pattern on its left and a field on its right
    ///
    /// # Examples
    /// ```text
    /// "^to " in meaning
    /// ```
    Keyword,

    /// Field path, numeric literal, method name or quoted text
    ///
    /// # Examples
    /// ```text
    /// pos[noun][data]
    /// 3
    /// "part of speech"
    /// ```
    String,

    /// `not`
    UnaryLogicOp,

    /// `and`, `or`, `<`, `<=`, `>`, `>=`, `==`, `!=`
    BinaryLogicOp,

    LeftParen,

    RightParen,

    Comma,

    /// Synthetic end-of-input marker
    End,
}

impl TokenType {
    /// Token types allowed to follow `self`.
    pub fn successors(self) -> &'static [TokenType] {
        use TokenType::*;
        match self {
            Start => &[String, UnaryLogicOp, LeftParen, End],
            String => &[Keyword, BinaryLogicOp, LeftParen, RightParen, Comma, End],
            Keyword => &[String],
            UnaryLogicOp | BinaryLogicOp | LeftParen | Comma => {
                &[String, UnaryLogicOp, LeftParen]
            }
            RightParen => &[BinaryLogicOp, RightParen, Comma, End],
            End => &[],
        }
    }

    pub fn allows(self, next: TokenType) -> bool {
        self.successors().contains(&next)
    }

    /// Types a piece of text may take, in order of preference.
    fn candidates(text: &str, quoted: bool) -> &'static [TokenType] {
        use TokenType::*;
        if quoted {
            return &[String];
        }
        match text {
            "(" => &[LeftParen],
            ")" => &[RightParen],
            "," => &[Comma],
            "not" => &[UnaryLogicOp, String],
            "in" => &[Keyword, String],
            "and" | "or" | "<" | "<=" | ">" | ">=" | "==" | "!=" => &[BinaryLogicOp, String],
            _ => &[String],
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenType::Start => "start of query",
            TokenType::Keyword => "keyword",
            TokenType::String => "string",
            TokenType::UnaryLogicOp => "unary operator",
            TokenType::BinaryLogicOp => "binary operator",
            TokenType::LeftParen => "'('",
            TokenType::RightParen => "')'",
            TokenType::Comma => "','",
            TokenType::End => "end of query",
        };
        f.write_str(name)
    }
}

/// A lexical token. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    value: String,
    start: usize,
    length: usize,
    kind: TokenType,
    previous: TokenType,
    quoted: bool,
}

impl Token {
    /// Build a token, deducing its type from its text and the type of the
    /// token before it.
    ///
    /// `length` covers the source span, quotes included.
    pub fn new(
        value: impl Into<String>,
        start: usize,
        length: usize,
        previous: TokenType,
        quoted: bool,
    ) -> Result<Self, LexError> {
        let value = value.into();
        let kind = TokenType::candidates(&value, quoted)
            .iter()
            .copied()
            .find(|candidate| previous.allows(*candidate))
            .ok_or_else(|| LexError::WrongToken {
                token: value.clone(),
                previous,
                position: Position::new(start, length),
            })?;

        Ok(Token {
            value,
            start,
            length,
            kind,
            previous,
            quoted,
        })
    }

    /// The synthetic END token at `start`.
    pub fn end(start: usize, previous: TokenType) -> Result<Self, LexError> {
        if !previous.allows(TokenType::End) {
            return Err(LexError::WrongToken {
                token: String::new(),
                previous,
                position: Position::new(start, 0),
            });
        }
        Ok(Token {
            value: String::new(),
            start,
            length: 0,
            kind: TokenType::End,
            previous,
            quoted: false,
        })
    }

    /// Token text; quoted tokens are stored without their quotes.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn kind(&self) -> TokenType {
        self.kind
    }

    pub fn previous(&self) -> TokenType {
        self.previous
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    pub fn position(&self) -> Position {
        Position::new(self.start, self.length)
    }
}
