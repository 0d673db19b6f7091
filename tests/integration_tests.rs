// tests/integration_tests.rs

use pretty_assertions::assert_eq;
use rstest::rstest;
use typeflow::value::{ListValue, NumberValue};
use typeflow::{DataValue, EngineConfig, EvalError, Evaluator, MemoryStore, StoredValue, ValueStore};

fn eval(text: &str) -> String {
    Evaluator::new().process(text).unwrap()
}

// ============================================================================
// Substitution
// ============================================================================

#[test]
fn test_plain_value() {
    assert_eq!(eval("[TEXT(hello)]"), "hello");
}

#[rstest]
#[case("")]
#[case("hello")]
#[case("[not an expression]")]
#[case("TEXT(a) => upper")]
fn test_text_without_expressions_unchanged(#[case] text: &str) {
    assert_eq!(eval(text), text);
}

#[test]
fn test_surrounding_text_preserved() {
    assert_eq!(eval("x [TEXT(a) => upper] y"), "x A y");
    assert_eq!(eval("Total: [NUMBER(19.99) => multiply(3)]"), "Total: 59.97");
}

#[test]
fn test_every_occurrence_replaced() {
    assert_eq!(
        eval("[TEXT(a) => upper] and [TEXT(a) => upper]"),
        "A and A"
    );
}

#[test]
fn test_chain_order_matters() {
    assert_eq!(eval("[LIST(b,a,c) => ascending first]"), "a");
    assert_eq!(eval("[LIST(b,a,c) => first ascending]"), "b");
}

#[test]
fn test_empty_parens_equal_bare_call() {
    assert_eq!(eval("[LIST(b,a,c) => ascending() first()]"), "a");
}

#[test]
fn test_name_whitespace_before_paren() {
    assert_eq!(eval("[TEXT(x) => append (y)]"), "xy");
}

// ============================================================================
// Escapes
// ============================================================================

#[rstest]
#[case(r"[TEXT(a\,b) => append(\,c)]", "a,b,c")]
#[case(r"[TEXT(f) => append(\(x\))]", "f(x)")]
#[case(r"[TEXT(a) => append(\])]", "a]")]
#[case("[TEXT(x) => append((y))]", "x(y)")]
#[case("[TEXT(a-b) => replace(- %% , )]", "a, b")]
fn test_escapes(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(eval(input), expected);
}

#[test]
fn test_escapes_outside_expressions_preserved() {
    assert_eq!(eval(r"keep \, and \) [TEXT(x)]"), r"keep \, and \) x");
}

#[test]
fn test_private_use_characters_preserved() {
    assert_eq!(eval("\u{E002} [TEXT(a)]"), "\u{E002} a");
    assert_eq!(
        eval("[TEXT(\u{E000}x\u{E001}) => append(\u{E002})]"),
        "\u{E000}x\u{E001}\u{E002}"
    );
    assert_eq!(eval("[LIST(a\u{E002}b,c) => size]"), "2");
}

#[test]
fn test_custom_delimiter() {
    let mut evaluator = Evaluator::with_config(EngineConfig::default().with_delimiter(';'));
    assert_eq!(evaluator.process("[LIST(a;b;c) => size]").unwrap(), "3");
    assert_eq!(evaluator.process("[LIST(a,b;c) => first]").unwrap(), "a,b");
    assert_eq!(evaluator.process("[TEXT(x) => append(1;2)]").unwrap(), "x12");
    assert_eq!(evaluator.process(r"[TEXT(x) => append(\;)]").unwrap(), "x;");
}

// ============================================================================
// Nesting and re-evaluation
// ============================================================================

#[test]
fn test_nested_in_seed() {
    assert_eq!(eval("[LIST(a,[TEXT(b) => upper],c) => join(-)]"), "a-B-c");
}

#[test]
fn test_nested_in_argument() {
    assert_eq!(eval("[TEXT(x) => append([NUMBER(1) => add(1)])]"), "x2");
}

#[test]
fn test_deep_nesting() {
    assert_eq!(
        eval("[LIST(1,[NUMBER([TEXT(5) => append(0)]) => add(1)],3) => sum]"),
        "55"
    );
}

#[test]
fn test_result_is_itself_an_expression() {
    assert_eq!(eval(r"[TEXT(NUMBER) => prepend([) append(\(7\)\])]"), "7");
}

#[test]
fn test_pass_limit() {
    let input = r"[TEXT(NUMBER) => prepend([) append(\(7\)\])]";

    let mut evaluator = Evaluator::with_config(EngineConfig::default().with_max_passes(1));
    assert_eq!(evaluator.process(input).unwrap_err(), EvalError::PassLimit(1));

    let mut evaluator = Evaluator::with_config(EngineConfig::default().with_max_passes(2));
    assert_eq!(evaluator.process(input).unwrap(), "7");
}

// ============================================================================
// Expressions left as written
// ============================================================================

#[test]
fn test_malformed_chain_left_literal() {
    let input = "keep [TEXT(a) => upper)] this";
    assert_eq!(eval(input), input);
}

#[test]
fn test_malformed_expression_does_not_block_others() {
    assert_eq!(
        eval("[TEXT(b) => upper] [TEXT(a) => upper)]"),
        "B [TEXT(a) => upper)]"
    );
}

#[test]
fn test_chain_end_without_value() {
    let input = "[TEXT(abc) => between(x,y) upper]";
    assert_eq!(eval(input), input);
}

#[test]
fn test_failed_nested_expression_keeps_enclosing_literal() {
    let input = "[TEXT(x) => append([TEXT(abc) => between(q,r)])]";
    assert_eq!(eval(input), input);
}

#[test]
fn test_failed_nested_expression_does_not_block_siblings() {
    assert_eq!(
        eval("[TEXT(x) => append([TEXT(abc) => between(q,r)])] [TEXT(y) => upper]"),
        "[TEXT(x) => append([TEXT(abc) => between(q,r)])] Y"
    );
}

#[test]
fn test_no_textual_form() {
    assert_eq!(eval("[JSON(null)]"), "[JSON(null)]");
    assert_eq!(eval("a[JSON(null)  ]b"), "ab");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_conversion_error() {
    let err = Evaluator::new().process("x [NUMBER(abc)]").unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Cannot convert 'abc' to NUMBER: 'abc' is not a number")
    );
}

#[test]
fn test_unknown_function_aborts() {
    let err = Evaluator::new()
        .process("[TEXT(ok)] [TEXT(a) => shout]")
        .unwrap_err();
    assert!(matches!(err, EvalError::UnknownFunction { .. }));
}

// ============================================================================
// Store and resume
// ============================================================================

#[test]
fn test_store_then_resume() {
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.process("[LIST(x,y,z) => store(items)]").unwrap(), "x,y,z");
    assert_eq!(evaluator.process("[LIST(items) => size]").unwrap(), "3");
}

#[test]
fn test_store_then_resume_in_one_text() {
    let mut evaluator = Evaluator::new();
    assert_eq!(
        evaluator
            .process("[LIST(a,b,c) => store(X)] then [LIST(X) => size]")
            .unwrap(),
        "a,b,c then 3"
    );
}

#[test]
fn test_siblings_resolve_in_reading_order() {
    assert_eq!(
        eval("[NUMBER(1) => store(n)] [NUMBER(n) => add(1) store(n)] [NUMBER(n) => add(1)]"),
        "1 2 3"
    );
    assert_eq!(
        eval("[TEXT([LIST(a,b) => store(v) size]) => append([LIST(v) => last])]"),
        "2b"
    );
}

#[test]
fn test_resume_keeps_number_scale() {
    let mut evaluator = Evaluator::new();
    evaluator.process("[NUMBER(2.50) => store(price)]").unwrap();
    assert_eq!(evaluator.process("[NUMBER(price)]").unwrap(), "2.50");
    assert_eq!(evaluator.process("[NUMBER(price) => multiply(2)]").unwrap(), "5.00");
}

#[test]
fn test_snapshot_isolation() {
    let mut evaluator = Evaluator::new();
    let out = evaluator
        .process("[LIST(c,a,b) => store(orig) ascending append(d) store(sorted)]")
        .unwrap();
    assert_eq!(out, "a,b,c,d");

    assert_eq!(
        evaluator.store().get("orig"),
        Some(&StoredValue::Data(DataValue::List(ListValue::new(
            vec!["c".to_string(), "a".to_string(), "b".to_string()],
            ','
        ))))
    );
    assert_eq!(evaluator.process("[LIST(orig)]").unwrap(), "c,a,b");
    assert_eq!(evaluator.process("[LIST(sorted)]").unwrap(), "a,b,c,d");
}

#[test]
fn test_resume_requires_matching_type() {
    let mut evaluator = Evaluator::new();
    evaluator.process("[NUMBER(5) => store(n)]").unwrap();
    assert_eq!(evaluator.process("[TEXT(n)]").unwrap(), "n");
    assert_eq!(evaluator.process("[LIST(n) => size]").unwrap(), "1");
}

#[test]
fn test_unknown_name_parsed_as_text() {
    assert_eq!(eval("[LIST(unknown) => size]"), "1");
}

#[test]
fn test_host_array_resumes_as_list() {
    let mut evaluator = Evaluator::new();
    evaluator.store_mut().set(
        "names",
        StoredValue::Array(vec!["a".to_string(), "b".to_string()]),
    );
    assert_eq!(evaluator.process("[LIST(names) => size]").unwrap(), "2");
}

#[test]
fn test_host_text_never_resumed() {
    let mut evaluator = Evaluator::new();
    evaluator
        .store_mut()
        .set("greeting", StoredValue::Text("hello".to_string()));
    assert_eq!(evaluator.process("[TEXT(greeting)]").unwrap(), "greeting");
}

#[test]
fn test_json_array_resumes_as_list() {
    let mut evaluator = Evaluator::new();
    evaluator
        .process(r#"[JSON(["x","y",3]) => store(doc)]"#)
        .unwrap();
    assert_eq!(evaluator.process("[LIST(doc) => join(+)]").unwrap(), "x+y+3");
}

#[test]
fn test_custom_store() {
    let mut store = MemoryStore::new();
    store.set(
        "total",
        StoredValue::Data(DataValue::Number(NumberValue::from(40))),
    );
    let mut evaluator = Evaluator::new().with_store(Box::new(store));
    assert_eq!(evaluator.process("[NUMBER(total) => add(2)]").unwrap(), "42");
}

// ============================================================================
// Parse without evaluating
// ============================================================================

#[test]
fn test_parse_builds_seed() {
    let mut evaluator = Evaluator::new();
    let expr = evaluator
        .parse("a [NUMBER(2) => add(1)] b", false)
        .unwrap()
        .unwrap();
    assert_eq!(
        expr.value,
        Some(DataValue::Number(NumberValue::from(2)))
    );
    assert_eq!(expr.invocations.len(), 1);
    assert_eq!(expr.canonical(), "[NUMBER(2) => add(1)]");
}

#[test]
fn test_parse_syntax_only_swallows_conversion_errors() {
    let mut evaluator = Evaluator::new();
    assert!(evaluator.parse("[NUMBER(abc)]", true).unwrap().is_none());
    assert!(evaluator.parse("[NUMBER(abc)]", false).is_err());
    assert!(evaluator.parse("nothing here", false).unwrap().is_none());
}

#[test]
fn test_evaluate_prebuilt_expression() {
    let mut evaluator = Evaluator::new();
    let expr = evaluator
        .parse("[LIST(b,a) => ascending]", false)
        .unwrap()
        .unwrap();
    assert_eq!(evaluator.evaluate(expr).unwrap(), Some("a,b".to_string()));
}

// ============================================================================
// Content resolution
// ============================================================================

#[test]
fn test_resolve_files() {
    let path = std::env::temp_dir().join("typeflow_resolve_files_test.txt");
    std::fs::write(&path, "from disk").unwrap();
    let seed = path.to_string_lossy().to_string();

    let mut literal = Evaluator::new();
    assert_eq!(
        literal.process(&format!("[TEXT({})]", seed)).unwrap(),
        seed
    );

    let mut resolving = Evaluator::with_config(EngineConfig::default().with_resolve_files(true));
    assert_eq!(
        resolving
            .process(&format!("[TEXT({}) => upper]", seed))
            .unwrap(),
        "FROM DISK"
    );

    std::fs::remove_file(&path).unwrap();
}
