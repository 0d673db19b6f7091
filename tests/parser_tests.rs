// tests/parser_tests.rs

use pretty_assertions::assert_eq;
use rstest::rstest;
use typeflow::ast::{Invocation, TypeKeyword};
use typeflow::escape::EscapeCodec;
use typeflow::parser::Parser;

fn find(text: &str) -> Option<typeflow::Expression> {
    let codec = EscapeCodec::new(',');
    let parser = Parser::new(&codec, ',');
    parser.find_first(&codec.encode(text))
}

// ============================================================================
// Recognition
// ============================================================================

#[test]
fn test_plain_expression() {
    let expr = find("[TEXT(hello)]").unwrap();
    assert_eq!(expr.keyword, TypeKeyword::Text);
    assert_eq!(expr.seed, "hello");
    assert!(expr.invocations.is_empty());
    assert_eq!(expr.matched, "[TEXT(hello)]");
    assert_eq!(expr.span, 0..13);
    assert!(expr.value.is_none());
}

#[test]
fn test_expression_with_chain() {
    let expr = find("[TEXT(a) => replace(x,y) upper]").unwrap();
    assert_eq!(
        expr.invocations,
        vec![
            Invocation {
                name: "replace".to_string(),
                args: vec!["x".to_string(), "y".to_string()],
                source: "replace(x,y)".to_string(),
            },
            Invocation::new("upper", Vec::new()),
        ]
    );
}

#[test]
fn test_embedded_in_text() {
    let expr = find("Hello [TEXT(world) => upper]!").unwrap();
    assert_eq!(expr.span, 6..28);
    assert_eq!(expr.matched, "[TEXT(world) => upper]");
}

#[rstest]
#[case("[text(a)]")]
#[case("[TEXT(a)")]
#[case("TEXT(a)")]
#[case("[UNKNOWN(a)]")]
#[case("[TEXT(a) => upper")]
#[case("no brackets at all")]
fn test_not_an_expression(#[case] text: &str) {
    assert!(find(text).is_none());
}

#[test]
fn test_siblings_in_reading_order() {
    let codec = EscapeCodec::new(',');
    let parser = Parser::new(&codec, ',');

    let found = parser.find_all("x [TEXT(a)] y [NUMBER(1)] z");
    let keywords: Vec<TypeKeyword> = found.iter().map(|e| e.keyword).collect();
    assert_eq!(keywords, vec![TypeKeyword::Text, TypeKeyword::Number]);
    assert_eq!(found[0].span, 2..11);
}

#[test]
fn test_nested_before_parent() {
    let codec = EscapeCodec::new(',');
    let parser = Parser::new(&codec, ',');

    let found = parser.find_all("[TEXT([LIST(a) => size]) => append([NUMBER(1)])] [TEXT(z)]");
    let matched: Vec<&str> = found.iter().map(|e| e.matched.as_str()).collect();
    assert_eq!(
        matched,
        vec![
            "[LIST(a) => size]",
            "[NUMBER(1)]",
            "[TEXT([LIST(a) => size]) => append([NUMBER(1)])]",
            "[TEXT(z)]",
        ]
    );
}

#[test]
fn test_innermost_first() {
    let expr = find("[LIST(a,[TEXT(b)],c)]").unwrap();
    assert_eq!(expr.keyword, TypeKeyword::Text);
    assert_eq!(expr.span, 8..17);
}

#[test]
fn test_seed_with_nested_brackets() {
    let expr = find("[JSON([1,2,3]) => count]").unwrap();
    assert_eq!(expr.keyword, TypeKeyword::Json);
    assert_eq!(expr.seed, "[1,2,3]");
}

#[test]
fn test_whitespace_in_structure() {
    let expr = find("[ TEXT (a)  =>  upper   append(b) ]").unwrap();
    assert_eq!(expr.keyword, TypeKeyword::Text);
    assert_eq!(expr.invocations.len(), 2);
    assert_eq!(expr.canonical(), "[TEXT(a) => upper append(b)]");
    assert_eq!(expr.matched, "[ TEXT (a)  =>  upper   append(b) ]");
}

#[test]
fn test_literal_bracket_in_argument() {
    let expr = find("[TEXT(x) => prepend([)]").unwrap();
    assert_eq!(expr.invocations[0].args, vec!["["]);
}

// ============================================================================
// Escapes
// ============================================================================

#[test]
fn test_escaped_seed_keeps_backslash() {
    let expr = find(r"[TEXT(a\,b) => append(\,c)]").unwrap();
    assert_eq!(expr.seed, r"a\,b");
    assert_eq!(expr.invocations[0].args, vec![",c"]);
    assert_eq!(expr.invocations[0].source, r"append(\,c)");
    assert_eq!(expr.matched, r"[TEXT(a\,b) => append(\,c)]");
}

#[test]
fn test_escaped_close_paren_in_seed() {
    let expr = find(r"[TEXT(f\(x\)) => upper]").unwrap();
    assert_eq!(expr.seed, r"f\(x\)");
}

#[test]
fn test_escaped_bracket_in_argument() {
    let expr = find(r"[TEXT(a) => append(\])]").unwrap();
    assert_eq!(expr.invocations[0].args, vec!["]"]);
}

// ============================================================================
// Malformed chains
// ============================================================================

#[rstest]
#[case("[TEXT(a) => upper)]")]
#[case("[TEXT(a) => (x)]")]
fn test_malformed_chain_skipped(#[case] text: &str) {
    assert!(find(text).is_none());
}

#[test]
fn test_malformed_candidate_skipped_among_siblings() {
    let expr = find("[TEXT(a) => upper)] [TEXT(ok)]").unwrap();
    assert_eq!(expr.seed, "ok");
}

#[test]
fn test_private_use_text_is_not_structure() {
    let text = "[TEXT(a\u{E002}b) => append(\u{E000})]";
    let codec = EscapeCodec::avoiding(',', text);
    let parser = Parser::new(&codec, ',');

    let expr = parser.find_first(&codec.encode(text)).unwrap();
    assert_eq!(expr.seed, "a\u{E002}b");
    assert_eq!(expr.invocations[0].args, vec!["\u{E000}"]);
    assert_eq!(expr.matched, text);
}

// ============================================================================
// Parameter splitting
// ============================================================================

#[rstest]
#[case("a,b", vec!["a", "b"])]
#[case(" a , b ", vec![" a ", " b "])]
#[case("a,,b", vec!["a", "", "b"])]
#[case("x,y %% z", vec!["x,y", "z"])]
#[case("- %% , ", vec!["-", ", "])]
#[case("", vec![])]
fn test_split_params(#[case] params: &str, #[case] expected: Vec<&str>) {
    let codec = EscapeCodec::new(',');
    let parser = Parser::new(&codec, ',');
    assert_eq!(parser.split_params(params), expected);
}

#[test]
fn test_split_params_custom_delimiter() {
    let codec = EscapeCodec::new(';');
    let parser = Parser::new(&codec, ';');
    assert_eq!(parser.split_params("a,b;c"), vec!["a,b", "c"]);
    assert_eq!(parser.split_params(&codec.encode(r"a\;b;c")), vec!["a;b", "c"]);
}

#[test]
fn test_invocation_new_source() {
    let inv = Invocation::new("replace", vec!["a".to_string(), "b".to_string()]);
    assert_eq!(inv.source, "replace(a,b)");
    assert_eq!(Invocation::new("upper", Vec::new()).source, "upper");
}
