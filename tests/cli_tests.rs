// tests/cli_tests.rs

use serde_json::json;
use sift_lang::cli::{
    CheckOptions, CheckResult, CliError, DocCategory, execute_check, get_doc_category,
    get_docs_overview, json_to_value, value_to_json,
};
use sift_lang::{FilterError, Key, Mapping, Value};

fn options(query: &str, input: serde_json::Value) -> CheckOptions {
    CheckOptions {
        query: query.to_string(),
        input: Some(input.to_string()),
        ..Default::default()
    }
}

fn dictionary() -> serde_json::Value {
    json!([
        {"word": "run", "pos": {"noun": {"data": 1}, "verb": {"data": 2}}},
        {"word": "walk", "pos": {"verb": {"data": 1}}},
        {"word": "sprint", "pos": {"noun": {"data": 0}}}
    ])
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_filter_records() {
    let result = execute_check(&options("pos[$ANY][data] > 1", dictionary())).unwrap();
    match result {
        CheckResult::Matches(output) => {
            assert_eq!(
                output,
                json!([{"word": "run", "pos": {"noun": {"data": 1}, "verb": {"data": 2}}}])
            );
        }
        other => panic!("expected matches, got {:?}", other),
    }
}

#[test]
fn test_single_record_input() {
    let result = execute_check(&options("word", json!({"word": "run"}))).unwrap();
    match result {
        CheckResult::Matches(output) => assert_eq!(output, json!([{"word": "run"}])),
        other => panic!("expected matches, got {:?}", other),
    }
}

#[test]
fn test_eval_mode() {
    let mut opts = options("pos[$ANY][data]", dictionary());
    opts.eval = true;
    match execute_check(&opts).unwrap() {
        CheckResult::Results(output) => assert_eq!(output, json!([[1, 2], 1, 0])),
        other => panic!("expected results, got {:?}", other),
    }
}

#[test]
fn test_print_stops() {
    match execute_check(&options("print(word)", dictionary())).unwrap() {
        CheckResult::Printed { index, value } => {
            assert_eq!(index, 0);
            assert_eq!(value, json!("run"));
        }
        other => panic!("expected print, got {:?}", other),
    }
}

#[test]
fn test_syntax_only() {
    let opts = CheckOptions {
        query: "len(word) > 3".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(execute_check(&opts).unwrap(), CheckResult::SyntaxValid));
}

#[test]
fn test_syntax_error() {
    let opts = CheckOptions {
        query: "((word".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(execute_check(&opts), Err(CliError::Parse(_))));
}

#[test]
fn test_no_input() {
    let opts = CheckOptions {
        query: "word".to_string(),
        ..Default::default()
    };
    assert!(matches!(execute_check(&opts), Err(CliError::NoInput)));
}

#[test]
fn test_invalid_json() {
    let opts = CheckOptions {
        query: "word".to_string(),
        input: Some("{not json".to_string()),
        ..Default::default()
    };
    assert!(matches!(execute_check(&opts), Err(CliError::Json(_))));
}

#[test]
fn test_eval_failure() {
    let input = json!([{"n": 3}, {"n": "x"}]);
    match execute_check(&options("n > 2", input)) {
        Err(CliError::Filter(FilterError::Eval { index, .. })) => assert_eq!(index, 1),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_skip_errors() {
    let input = json!([{"n": 3}, {"n": "x"}]);
    let mut opts = options("n > 2", input.clone());
    opts.skip_errors = true;
    match execute_check(&opts).unwrap() {
        CheckResult::Matches(output) => assert_eq!(output, json!([{"n": 3}])),
        other => panic!("expected matches, got {:?}", other),
    }

    let mut opts = options("n > 2", input);
    opts.skip_errors = true;
    opts.eval = true;
    match execute_check(&opts).unwrap() {
        CheckResult::Results(output) => assert_eq!(output, json!([true, null])),
        other => panic!("expected results, got {:?}", other),
    }
}

// ============================================================================
// convert
// ============================================================================

#[test]
fn test_json_to_value() {
    let value = json_to_value(json!({"a": [1, 2.5, "x", null, true]}));
    assert_eq!(
        value,
        Value::object([(
            "a",
            Value::Array(vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Null,
                Value::Boolean(true),
            ])
        )])
    );
}

#[test]
fn test_json_key_order_kept() {
    let value = json_to_value(json!({"verb": 1, "noun": 2}));
    match value {
        Value::Object(map) => {
            let keys: Vec<&Key> = map.keys().collect();
            assert_eq!(keys, vec![&Key::from("verb"), &Key::from("noun")]);
        }
        other => panic!("expected mapping, got {:?}", other),
    }
}

#[test]
fn test_numeric_keys_written_as_strings() {
    let mut map = Mapping::new();
    map.insert(1i64, Value::from("one"));
    map.insert(2.5f64, Value::from("half"));
    assert_eq!(
        value_to_json(Value::Object(map)),
        json!({"1": "one", "2.5": "half"})
    );
}

#[test]
fn test_nan_becomes_null() {
    assert_eq!(value_to_json(Value::Float(f64::NAN)), json!(null));
}

// ============================================================================
// docs
// ============================================================================

#[test]
fn test_docs_overview_lists_categories() {
    let overview = get_docs_overview();
    for category in ["syntax", "paths", "operators", "methods", "sequences"] {
        assert!(overview.contains(category), "missing {}", category);
        assert!(get_doc_category(category).is_ok());
    }
}

#[test]
fn test_doc_aliases() {
    assert_eq!(DocCategory::from_name("PATH"), Some(DocCategory::Paths));
    assert_eq!(DocCategory::from_name("broadcasting"), Some(DocCategory::Sequences));
    assert_eq!(DocCategory::from_name("pipes"), None);
}

#[test]
fn test_unknown_doc_category() {
    assert!(matches!(
        get_doc_category("arithmetic"),
        Err(CliError::UnknownCategory(name)) if name == "arithmetic"
    ));
}
