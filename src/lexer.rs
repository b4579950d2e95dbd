use std::fmt;

use crate::ast::{Token, TokenType};

/// Character span of a token inside the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub start: usize,
    pub length: usize,
}

impl Position {
    pub fn new(start: usize, length: usize) -> Self {
        Position { start, length }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position {}", self.start)
    }
}

/// Errors raised while scanning a query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    /// Unbalanced parentheses or an unterminated quoted string
    #[error("syntax error at {position}: {message}")]
    Syntax {
        message: String,
        token: String,
        position: Position,
    },

    /// The token cannot follow the previous one
    #[error("unexpected {} after {previous} at {position}", describe_token(.token))]
    WrongToken {
        token: String,
        previous: TokenType,
        position: Position,
    },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::Syntax { position, .. } | LexError::WrongToken { position, .. } => *position,
        }
    }
}

fn describe_token(token: &str) -> String {
    if token.is_empty() {
        "end of query".to_string()
    } else {
        format!("'{}'", token)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    previous: TokenType,
    open_parens: Vec<usize>,
    end: Option<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            previous: TokenType::Start,
            open_parens: Vec::new(),
            end: None,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.input[start..end].iter().collect()
    }

    /// Read a double-quoted span. `\"` yields a quote; any other escape is
    /// kept verbatim so that patterns keep their regex escapes.
    fn read_quoted(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('"') => result.push('"'),
                        Some(escaped) => {
                            result.push('\\');
                            result.push(escaped);
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::Syntax {
            message: "unterminated string: missing closing quote".to_string(),
            token: self.text(start, self.input.len()),
            position: Position::new(start, self.input.len() - start),
        })
    }

    fn read_bare(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || ch == '(' || ch == ')' {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    /// Scan the next token. Once input is exhausted this keeps returning
    /// the END token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(end) = &self.end {
            return Ok(end.clone());
        }

        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char() {
            None => {
                if let Some(&open) = self.open_parens.first() {
                    return Err(LexError::Syntax {
                        message: "unbalanced parentheses: '(' is never closed".to_string(),
                        token: self.text(open, self.input.len()),
                        position: Position::new(open, self.input.len() - open),
                    });
                }
                let end = Token::end(start, self.previous)?;
                self.end = Some(end.clone());
                return Ok(end);
            }
            Some('(') => {
                self.advance();
                self.open_parens.push(start);
                Token::new("(", start, 1, self.previous, false)?
            }
            Some(')') => {
                if self.open_parens.pop().is_none() {
                    return Err(LexError::Syntax {
                        message: "unbalanced parentheses: unexpected ')'".to_string(),
                        token: ")".to_string(),
                        position: Position::new(start, 1),
                    });
                }
                self.advance();
                Token::new(")", start, 1, self.previous, false)?
            }
            Some('"') => {
                let text = self.read_quoted()?;
                Token::new(text, start, self.position - start, self.previous, true)?
            }
            Some(_) => {
                let text = self.read_bare();
                Token::new(text, start, self.position - start, self.previous, false)?
            }
        };

        self.previous = token.kind();
        Ok(token)
    }
}

/// Scan a whole query, END token included.
pub fn tokenize(expression: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(expression);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind() == TokenType::End;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_keyword_after_field() {
    let tokens = tokenize("to in meaning").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            TokenType::String,
            TokenType::Keyword,
            TokenType::String,
            TokenType::End
        ]
    );
}

#[test]
fn test_operator_words_as_fields() {
    let mut lexer = Lexer::new("(in)");
    assert_eq!(lexer.next_token().unwrap().kind(), TokenType::LeftParen);
    let field = lexer.next_token().unwrap();
    assert_eq!(field.kind(), TokenType::String);
    assert_eq!(field.value(), "in");
    assert_eq!(lexer.next_token().unwrap().kind(), TokenType::RightParen);
    assert_eq!(lexer.next_token().unwrap().kind(), TokenType::End);
    assert_eq!(lexer.next_token().unwrap().kind(), TokenType::End);
}
