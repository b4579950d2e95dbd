// tests/parser_tests.rs

use sift_lang::ast::{BinOp, FieldPath, Keyword, Method, Node, Operand, Segment, UnaryOp};
use sift_lang::lexer::{LexError, Position, tokenize};
use sift_lang::parser::{MAX_NESTING, ParseError, Parser};
use sift_lang::{Value, compile};

fn parse(query: &str) -> Node {
    let tokens = tokenize(query).unwrap();
    Parser::new(tokens).parse().unwrap()
}

fn parse_err(query: &str) -> ParseError {
    match compile(query) {
        Ok(q) => panic!("expected an error for {:?}, got {:?}", query, q.root()),
        Err(e) => e,
    }
}

fn path(text: &str) -> Operand {
    Operand::Path(FieldPath::parse(text).unwrap())
}

/// Compact rendering of a tree: `(op left right)`.
fn sexpr(node: &Node) -> String {
    match node {
        Node::Operand { operand, .. } => match operand {
            Operand::Number(Value::Integer(n)) => n.to_string(),
            Operand::Number(Value::Float(n)) => format!("{:?}", n),
            Operand::Number(other) => format!("{:?}", other),
            Operand::Path(p) => p.to_string(),
        },
        Node::Method {
            method, argument, ..
        } => format!("({} {})", method, sexpr(argument)),
        Node::Unary { operand, .. } => format!("(not {})", sexpr(operand)),
        Node::Binary {
            op, left, right, ..
        } => format!("({} {} {})", op, sexpr(left), sexpr(right)),
        Node::Keyword { pattern, field, .. } => {
            let field = match field {
                Operand::Path(p) => p.to_string(),
                Operand::Number(n) => format!("{:?}", n),
            };
            format!("(in /{}/ {})", pattern.as_str(), field)
        }
    }
}

// ============================================================================
// Operands
// ============================================================================

#[test]
fn test_field_operand() {
    match parse("meaning") {
        Node::Operand { operand, token } => {
            assert_eq!(operand, path("meaning"));
            assert_eq!(token.value(), "meaning");
        }
        other => panic!("expected operand, got {:?}", other),
    }
}

#[test]
fn test_integer_literal() {
    match parse("3") {
        Node::Operand { operand, .. } => assert_eq!(operand, Operand::Number(Value::Integer(3))),
        other => panic!("expected operand, got {:?}", other),
    }
}

#[test]
fn test_decimal_literals() {
    let cases = [
        ("-2", Value::Integer(-2)),
        ("0.5", Value::Float(0.5)),
        (".5", Value::Float(0.5)),
        ("-1.", Value::Float(-1.0)),
        ("10.25", Value::Float(10.25)),
    ];
    for (text, expected) in cases {
        match parse(text) {
            Node::Operand { operand, .. } => {
                assert_eq!(operand, Operand::Number(expected), "Failed for: {}", text)
            }
            other => panic!("expected operand, got {:?}", other),
        }
    }
}

#[test]
fn test_field_prefix_forces_path() {
    match parse("f_$3") {
        Node::Operand { operand, .. } => {
            assert_eq!(operand, path("3"));
        }
        other => panic!("expected operand, got {:?}", other),
    }
}

#[test]
fn test_not_quite_numbers_are_paths() {
    for text in ["1e5", "1.2.3", "-", "3a"] {
        match parse(text) {
            Node::Operand {
                operand: Operand::Path(_),
                ..
            } => {}
            other => panic!("expected a path for {}, got {:?}", text, other),
        }
    }
}

#[test]
fn test_nested_path_operand() {
    match parse("pos[$ANY][data]") {
        Node::Operand {
            operand: Operand::Path(p),
            ..
        } => assert_eq!(
            p.segments(),
            &[
                Segment::Key("pos".into()),
                Segment::Any,
                Segment::Key("data".into())
            ]
        ),
        other => panic!("expected operand, got {:?}", other),
    }
}

#[test]
fn test_quoted_operand_is_path() {
    match parse("\"part of speech\"") {
        Node::Operand { operand, .. } => assert_eq!(operand, path("part of speech")),
        other => panic!("expected operand, got {:?}", other),
    }
}

#[test]
fn test_non_ascii_digits_are_paths() {
    match parse("١٢") {
        Node::Operand { operand, .. } => assert_eq!(operand, path("١٢")),
        other => panic!("expected operand, got {:?}", other),
    }

    let record = Value::object([("١٢", Value::from("x"))]);
    let query = compile("١٢").unwrap();
    let result = query.evaluate(&record).value().unwrap().into_value().unwrap();
    assert_eq!(result, Value::from("x"));
}

// ============================================================================
// Operators and Precedence
// ============================================================================

#[test]
fn test_comparison() {
    match parse("len(meaning) > 3") {
        Node::Binary {
            op, left, right, ..
        } => {
            assert_eq!(op, BinOp::GreaterThan);
            assert!(matches!(
                *left,
                Node::Method {
                    method: Method::Len,
                    ..
                }
            ));
            assert!(matches!(*right, Node::Operand { .. }));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(sexpr(&parse("a or b and c")), "(or a (and b c))");
    assert_eq!(sexpr(&parse("a and b or c")), "(or (and a b) c)");
}

#[test]
fn test_comparison_binds_tighter_than_and() {
    assert_eq!(
        sexpr(&parse("a == 1 and b < 2")),
        "(and (== a 1) (< b 2))"
    );
}

#[test]
fn test_same_tier_groups_left() {
    assert_eq!(sexpr(&parse("a or b or c")), "(or (or a b) c)");
    assert_eq!(sexpr(&parse("a == b != c")), "(!= (== a b) c)");
}

#[test]
fn test_not_binds_tightest() {
    assert_eq!(sexpr(&parse("not a == b")), "(== (not a) b)");
    assert_eq!(sexpr(&parse("not a and b")), "(and (not a) b)");
}

#[test]
fn test_double_not_nests() {
    match parse("not not x") {
        Node::Unary {
            op: UnaryOp::Not,
            operand,
            ..
        } => assert!(matches!(
            *operand,
            Node::Unary {
                op: UnaryOp::Not,
                ..
            }
        )),
        other => panic!("expected unary, got {:?}", other),
    }
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(sexpr(&parse("(a or b) and c")), "(and (or a b) c)");
    assert_eq!(sexpr(&parse("not (a and b)")), "(not (and a b))");
}

#[test]
fn test_redundant_parentheses() {
    assert_eq!(sexpr(&parse("((a))")), "a");
}

#[test]
fn test_all_comparisons() {
    let cases = [
        ("==", BinOp::Equal),
        ("!=", BinOp::NotEqual),
        ("<", BinOp::LessThan),
        (">", BinOp::GreaterThan),
        ("<=", BinOp::LessEqual),
        (">=", BinOp::GreaterEqual),
    ];
    for (symbol, expected) in cases {
        match parse(&format!("a {} b", symbol)) {
            Node::Binary { op, .. } => assert_eq!(op, expected, "Failed for: {}", symbol),
            other => panic!("expected binary, got {:?}", other),
        }
    }
}

// ============================================================================
// Methods and Keywords
// ============================================================================

#[test]
fn test_every_method_name() {
    for name in ["len", "split", "any", "all", "lower", "upper", "reduce", "print"] {
        match parse(&format!("{}(x)", name)) {
            Node::Method { method, token, .. } => {
                assert_eq!(method.name(), name);
                assert_eq!(token.value(), name);
            }
            other => panic!("expected method, got {:?}", other),
        }
    }
}

#[test]
fn test_nested_methods() {
    assert_eq!(
        sexpr(&parse("any(lower(tags) == slang)")),
        "(any (== (lower tags) slang))"
    );
}

#[test]
fn test_method_argument_is_expression() {
    assert_eq!(sexpr(&parse("len(a or b)")), "(len (or a b))");
}

#[test]
fn test_keyword_expression() {
    match parse("\"^to \" in meaning") {
        Node::Keyword {
            keyword,
            pattern,
            field,
            token,
        } => {
            assert_eq!(keyword, Keyword::In);
            assert_eq!(pattern.as_str(), "^to ");
            assert_eq!(field, path("meaning"));
            assert_eq!(token.value(), "in");
        }
        other => panic!("expected keyword, got {:?}", other),
    }
}

#[test]
fn test_keyword_with_number_pattern() {
    assert_eq!(sexpr(&parse("1 in field")), "(in /1/ field)");
}

#[test]
fn test_keyword_under_not() {
    assert_eq!(sexpr(&parse("not 2 in field")), "(not (in /2/ field))");
}

#[test]
fn test_keyword_in_logic() {
    assert_eq!(
        sexpr(&parse("a in x and b in y")),
        "(and (in /a/ x) (in /b/ y))"
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_method() {
    match parse_err("length(x)") {
        ParseError::WrongMethod { token, position } => {
            assert_eq!(token, "length");
            assert_eq!(position, Position::new(0, 6));
        }
        other => panic!("expected wrong method, got {:?}", other),
    }
}

#[test]
fn test_invalid_pattern() {
    match parse_err("\"(\" in x") {
        ParseError::Syntax { token, .. } => assert_eq!(token, "("),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_unclosed_paren_is_syntax_error() {
    assert!(matches!(
        parse_err("((field"),
        ParseError::Lex(LexError::Syntax { .. })
    ));
}

#[test]
fn test_comma_is_tree_building_error() {
    match parse_err("len(a , b)") {
        ParseError::TreeBuilding { position, .. } => assert_eq!(position, Position::new(6, 1)),
        other => panic!("expected tree building error, got {:?}", other),
    }
}

#[test]
fn test_bad_numeric_segment() {
    match parse_err("senses[d_$x]") {
        ParseError::Syntax { position, .. } => assert_eq!(position, Position::new(7, 4)),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_unbalanced_brackets() {
    assert!(matches!(parse_err("pos[noun"), ParseError::Syntax { .. }));
    assert!(matches!(parse_err("pos]"), ParseError::Syntax { .. }));
    assert!(matches!(parse_err("pos[a]b"), ParseError::Syntax { .. }));
}

#[test]
fn test_lex_errors_pass_through() {
    assert!(matches!(
        parse_err("a b"),
        ParseError::Lex(LexError::WrongToken { .. })
    ));
}

#[test]
fn test_nesting_within_limit() {
    let depth = MAX_NESTING - 1;
    let query = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(sexpr(&parse(&query)), "a");
}

#[test]
fn test_nesting_too_deep() {
    let query = format!("{}a{}", "(".repeat(200_000), ")".repeat(200_000));
    match parse_err(&query) {
        ParseError::TreeBuilding { message, position } => {
            assert_eq!(message, "expression nested too deeply");
            assert_eq!(position, Position::new(MAX_NESTING - 1, 1));
        }
        other => panic!("expected tree building error, got {:?}", other),
    }
}

#[test]
fn test_method_calls_count_toward_nesting() {
    let query = format!("{}a{}", "len(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
    assert!(matches!(parse_err(&query), ParseError::TreeBuilding { .. }));
}

#[test]
fn test_render_underlines_span() {
    let err = parse_err("((field");
    let rendered = err.render("((field");
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[1], "  ((field");
    assert_eq!(lines[2], "  ^^^^^^^");
}

#[test]
fn test_render_points_at_token() {
    let err = parse_err("a and length(x)");
    let rendered = err.render("a and length(x)");
    assert!(rendered.ends_with("\n        ^^^^^^"));
}

#[test]
fn test_render_counts_wide_characters() {
    let query = "词 and length(x)";
    let rendered = parse_err(query).render(query);
    // `词` takes two columns
    assert!(rendered.ends_with("\n         ^^^^^^"));
}
