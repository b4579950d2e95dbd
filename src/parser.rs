use std::{collections::VecDeque, sync::LazyLock};

use regex::Regex;
use unicode_width::UnicodeWidthChar;

use crate::{
    ast::{BinOp, FieldPath, Keyword, Method, Node, Operand, Precedence, Token, TokenType, UnaryOp},
    lexer::{LexError, Position},
    value::Value,
};

/// Prefix forcing a token to be read as a field path.
pub const FIELD_PREFIX: &str = "f_$";

/// Deepest parenthesis or method-call nesting accepted.
pub const MAX_NESTING: usize = 128;

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?([0-9]+(\.[0-9]*)?|\.[0-9]+)$").expect("valid regex"));

/// Errors raised while compiling a query into an expression tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Malformed field path or pattern
    #[error("syntax error at {position}: {message}")]
    Syntax {
        message: String,
        token: String,
        position: Position,
    },

    #[error("unknown method '{token}' at {position}")]
    WrongMethod { token: String, position: Position },

    #[error("unknown keyword '{token}' at {position}")]
    WrongKeyword { token: String, position: Position },

    #[error("unknown logic operator '{token}' at {position}")]
    LogicOperator { token: String, position: Position },

    /// Tokens that do not reduce to a single expression
    #[error("cannot build expression at {position}: {message}")]
    TreeBuilding { message: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::Syntax { position, .. }
            | ParseError::WrongMethod { position, .. }
            | ParseError::WrongKeyword { position, .. }
            | ParseError::LogicOperator { position, .. }
            | ParseError::TreeBuilding { position, .. } => *position,
        }
    }

    /// The error followed by the query with the offending span underlined.
    ///
    /// ```text
    /// syntax error at position 0: unbalanced parentheses: '(' is never closed
    ///   ((field
    ///   ^^^^^^^
    /// ```
    ///
    /// Offsets are in characters; the underline is laid out in terminal
    /// columns so wide characters keep it aligned.
    pub fn render(&self, query: &str) -> String {
        let position = self.position();
        let line: Vec<char> = query
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();

        let start = position.start.min(line.len());
        let end = position.end().min(line.len());
        format!(
            "{}\n  {}\n  {}{}",
            self,
            line.iter().collect::<String>(),
            " ".repeat(columns(&line[..start])),
            "^".repeat(columns(&line[start..end]).max(1))
        )
    }

    fn logic_operator(token: &Token) -> Self {
        ParseError::LogicOperator {
            token: token.value().to_string(),
            position: token.position(),
        }
    }

    fn tree_building(message: impl Into<String>, position: Position) -> Self {
        ParseError::TreeBuilding {
            message: message.into(),
            position,
        }
    }
}

/// Terminal width of a run of characters.
fn columns(chars: &[char]) -> usize {
    chars.iter().map(|c| c.width().unwrap_or(0)).sum()
}

/// Working item of a group being reduced: a pending operator token or an
/// already built node.
#[derive(Debug)]
enum Item {
    Token(Token),
    Node(Node),
}

impl Item {
    fn position(&self) -> Position {
        match self {
            Item::Token(token) => token.position(),
            Item::Node(node) => node.token().position(),
        }
    }

    fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }
}

fn take_node(items: &mut Vec<Item>, index: usize) -> Option<Node> {
    match items.get(index) {
        Some(Item::Node(_)) => match items.remove(index) {
            Item::Node(node) => Some(node),
            Item::Token(_) => None,
        },
        _ => None,
    }
}

fn take_token(items: &mut Vec<Item>, index: usize) -> Option<Token> {
    match items.get(index) {
        Some(Item::Token(_)) => match items.remove(index) {
            Item::Token(token) => Some(token),
            Item::Node(_) => None,
        },
        _ => None,
    }
}

/// Builds an expression tree from a token sequence.
///
/// Tokens are consumed from a working queue. Each parenthesized group is
/// collected flat, atoms (operands, method calls, keyword expressions,
/// nested groups) are built on the way, then the group is reduced: `not`
/// first, then comparisons, `and` and `or`, each collapsed pairwise left
/// to right.
pub struct Parser {
    tokens: VecDeque<Token>,
    end: Position,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens
            .last()
            .map(|t| Position::new(t.start() + t.length(), 0))
            .unwrap_or(Position::new(0, 0));
        Parser {
            tokens: tokens.into(),
            end,
            depth: 0,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    fn check(&self, kind: TokenType) -> bool {
        self.tokens.front().is_some_and(|t| t.kind() == kind)
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        self.parse_group(None)
    }

    /// Parse one group, refusing to nest past [`MAX_NESTING`].
    fn parse_group(&mut self, open: Option<&Token>) -> Result<Node, ParseError> {
        if let Some(open) = open
            && self.depth >= MAX_NESTING
        {
            return Err(ParseError::tree_building(
                "expression nested too deeply",
                open.position(),
            ));
        }

        self.depth += 1;
        let node = self.collect_group(open);
        self.depth -= 1;
        node
    }

    /// Collect the items of one group, up to the matching `)` or END.
    fn collect_group(&mut self, open: Option<&Token>) -> Result<Node, ParseError> {
        let mut items = Vec::new();

        loop {
            let token = match self.advance() {
                Some(token) => token,
                None if open.is_none() => break,
                None => {
                    return Err(ParseError::tree_building(
                        "unexpected end of tokens inside parentheses",
                        self.end,
                    ));
                }
            };

            match token.kind() {
                TokenType::String => {
                    let node = self.parse_atom(token)?;
                    items.push(Item::Node(node));
                }
                TokenType::LeftParen => {
                    let node = self.parse_group(Some(&token))?;
                    items.push(Item::Node(node));
                }
                TokenType::UnaryLogicOp | TokenType::BinaryLogicOp => {
                    items.push(Item::Token(token));
                }
                TokenType::RightParen => {
                    return match open {
                        Some(open) => {
                            let span = Position::new(open.start(), token.start() + 1 - open.start());
                            Self::reduce(items, span)
                        }
                        None => Err(ParseError::Syntax {
                            message: "unbalanced parentheses: unexpected ')'".to_string(),
                            token: ")".to_string(),
                            position: token.position(),
                        }),
                    };
                }
                TokenType::End => match open {
                    Some(open) => {
                        return Err(ParseError::Syntax {
                            message: "unbalanced parentheses: '(' is never closed".to_string(),
                            token: "(".to_string(),
                            position: Position::new(open.start(), token.start() - open.start()),
                        });
                    }
                    None => break,
                },
                TokenType::Comma => {
                    return Err(ParseError::tree_building(
                        "methods take a single argument",
                        token.position(),
                    ));
                }
                TokenType::Keyword | TokenType::Start => {
                    return Err(ParseError::tree_building(
                        format!("unexpected '{}'", token.value()),
                        token.position(),
                    ));
                }
            }
        }

        Self::reduce(items, Position::new(0, self.end.start))
    }

    /// Build the atom starting at a STRING token: a method call, a keyword
    /// expression or a plain operand.
    fn parse_atom(&mut self, token: Token) -> Result<Node, ParseError> {
        if self.check(TokenType::LeftParen) {
            let method = Method::from_name(token.value()).ok_or_else(|| ParseError::WrongMethod {
                token: token.value().to_string(),
                position: token.position(),
            })?;
            let open = self.advance();
            let argument = self.parse_group(open.as_ref())?;
            return Ok(Node::Method {
                method,
                argument: Box::new(argument),
                token,
            });
        }

        if self.check(TokenType::Keyword) {
            let Some(keyword_token) = self.advance() else {
                return Err(ParseError::tree_building("missing keyword", token.position()));
            };
            let keyword =
                Keyword::from_name(keyword_token.value()).ok_or_else(|| ParseError::WrongKeyword {
                    token: keyword_token.value().to_string(),
                    position: keyword_token.position(),
                })?;
            let field_token = match self.advance() {
                Some(t) if t.kind() == TokenType::String => t,
                _ => {
                    return Err(ParseError::tree_building(
                        format!("'{}' needs a field on its right", keyword_token.value()),
                        keyword_token.position(),
                    ));
                }
            };
            let pattern = Regex::new(token.value()).map_err(|e| ParseError::Syntax {
                message: format!("invalid pattern: {}", e),
                token: token.value().to_string(),
                position: token.position(),
            })?;
            let field = parse_operand(&field_token)?;
            return Ok(Node::Keyword {
                keyword,
                pattern,
                field,
                token: keyword_token,
            });
        }

        let operand = parse_operand(&token)?;
        Ok(Node::Operand { operand, token })
    }

    /// Reduce a flat group to a single node.
    fn reduce(mut items: Vec<Item>, span: Position) -> Result<Node, ParseError> {
        Self::collapse_unary(&mut items)?;
        for tier in Precedence::TIERS {
            Self::collapse_binary(&mut items, tier)?;
        }

        if items.len() != 1 {
            let message = if items.is_empty() {
                "empty expression".to_string()
            } else {
                format!("expected a single expression, found {} parts", items.len())
            };
            return Err(ParseError::tree_building(message, span));
        }
        take_node(&mut items, 0)
            .ok_or_else(|| ParseError::tree_building("operator without operands", span))
    }

    /// Replace every `not` and the node to its right with a unary node.
    /// Right to left, so `not not x` nests.
    fn collapse_unary(items: &mut Vec<Item>) -> Result<(), ParseError> {
        for i in (0..items.len()).rev() {
            let op = match &items[i] {
                Item::Token(token) if token.kind() == TokenType::UnaryLogicOp => {
                    UnaryOp::from_symbol(token.value())
                        .ok_or_else(|| ParseError::logic_operator(token))?
                }
                _ => continue,
            };
            let position = items[i].position();
            let operand = take_node(items, i + 1).ok_or_else(|| {
                ParseError::tree_building("'not' needs an operand", position)
            })?;
            let token = take_token(items, i)
                .ok_or_else(|| ParseError::tree_building("'not' needs an operand", position))?;
            items.insert(
                i,
                Item::Node(Node::Unary {
                    op,
                    operand: Box::new(operand),
                    token,
                }),
            );
        }
        Ok(())
    }

    /// Collapse every `node op node` whose operator belongs to `tier`.
    fn collapse_binary(items: &mut Vec<Item>, tier: Precedence) -> Result<(), ParseError> {
        let mut i = 0;
        while i < items.len() {
            let op = match &items[i] {
                Item::Token(token) if token.kind() == TokenType::BinaryLogicOp => {
                    BinOp::from_symbol(token.value())
                        .ok_or_else(|| ParseError::logic_operator(token))?
                }
                _ => {
                    i += 1;
                    continue;
                }
            };
            if op.precedence() != tier {
                i += 1;
                continue;
            }

            let position = items[i].position();
            let has_operands =
                i > 0 && items[i - 1].is_node() && items.get(i + 1).is_some_and(Item::is_node);
            if !has_operands {
                return Err(ParseError::tree_building(
                    format!("'{}' needs an operand on both sides", op),
                    position,
                ));
            }

            let missing = || ParseError::tree_building(format!("'{}' is missing an operand", op), position);
            let right = take_node(items, i + 1).ok_or_else(missing)?;
            let token = take_token(items, i).ok_or_else(missing)?;
            let left = take_node(items, i - 1).ok_or_else(missing)?;
            items.insert(
                i - 1,
                Item::Node(Node::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    token,
                }),
            );
        }
        Ok(())
    }
}

/// Read a STRING token as a numeric literal or a field path.
fn parse_operand(token: &Token) -> Result<Operand, ParseError> {
    let text = token.value();
    let quote = usize::from(token.is_quoted());

    let (path_text, offset) = match text.strip_prefix(FIELD_PREFIX) {
        Some(rest) => (rest, FIELD_PREFIX.len()),
        None if DECIMAL_RE.is_match(text) => return parse_number(token).map(Operand::Number),
        None => (text, 0),
    };

    FieldPath::parse(path_text)
        .map(Operand::Path)
        .map_err(|e| ParseError::Syntax {
            message: e.message,
            token: text.to_string(),
            position: Position::new(token.start() + quote + offset + e.offset, e.length),
        })
}

fn parse_number(token: &Token) -> Result<Value, ParseError> {
    let text = token.value();
    if !text.contains('.')
        && let Ok(n) = text.parse::<i64>()
    {
        return Ok(Value::Integer(n));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|e| ParseError::Syntax {
            message: format!("invalid number: {}", e),
            token: text.to_string(),
            position: token.position(),
        })
}
