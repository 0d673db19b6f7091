// tests/value_tests.rs

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use typeflow::context::ExternalPayload;
use typeflow::{Collaborator, DataValue, EvalError, Evaluator, TypeKeyword};

fn eval(text: &str) -> String {
    Evaluator::new().process(text).unwrap()
}

// ============================================================================
// TEXT
// ============================================================================

#[rstest]
#[case("[TEXT(hello world) => title]", "Hello World")]
#[case("[TEXT(Hello) => upper]", "HELLO")]
#[case("[TEXT(abc) => upper lower]", "abc")]
#[case("[TEXT(  a   b  ) => pack]", "a b")]
#[case("[TEXT(  x  ) => trim]", "x")]
#[case("[TEXT(hello) => length]", "5")]
#[case("[TEXT(b) => prepend(a) append(c,d)]", "abcd")]
#[case("[TEXT(a.b.c) => replace(.,-)]", "a-b-c")]
#[case("[TEXT(banana) => remove(a)]", "bnn")]
#[case("[TEXT(prefix-body) => remove-start(prefix-)]", "body")]
#[case("[TEXT(file.txt) => removeEnd(.txt)]", "file")]
#[case("[TEXT(hello) => substring(1,3)]", "el")]
#[case("[TEXT(key=value) => before(=)]", "key")]
#[case("[TEXT(key=value) => after(=)]", "value")]
#[case("[TEXT(<b>bold</b>) => between(<b>,</b>)]", "bold")]
#[case("[TEXT(a;b;c) => list(;) size]", "3")]
#[case("[TEXT( 42 ) => number add(1)]", "43")]
#[case("[TEXT(  ) => isEmpty]", "true")]
#[case("[TEXT(x) => isEmpty]", "false")]
fn test_text_operations(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(eval(input), expected);
}

#[test]
fn test_text_between_missing_marker_leaves_expression() {
    assert_eq!(
        eval("[TEXT(abc) => between(x,y)]"),
        "[TEXT(abc) => between(x,y)]"
    );
}

#[test]
fn test_text_number_conversion_error() {
    let err = Evaluator::new()
        .process("[TEXT(abc) => number]")
        .unwrap_err();
    assert!(matches!(
        err,
        EvalError::Conversion {
            keyword: TypeKeyword::Number,
            ..
        }
    ));
}

// ============================================================================
// NUMBER
// ============================================================================

#[rstest]
#[case("[NUMBER(2.50)]", "2.50")]
#[case("[NUMBER(1e3)]", "1000")]
#[case("[NUMBER(+7)]", "7")]
#[case("[NUMBER(1.50) => add(2.25)]", "3.75")]
#[case("[NUMBER(10) => minus(3,2)]", "5")]
#[case("[NUMBER(1.5) => multiply(2)]", "3.0")]
#[case("[NUMBER(10) => divide(4)]", "2.5")]
#[case("[NUMBER(2.345) => round(2)]", "2.35")]
#[case("[NUMBER(2.5) => round]", "3")]
#[case("[NUMBER(-2.4) => abs]", "2.4")]
#[case("[NUMBER(2.1) => ceiling]", "3")]
#[case("[NUMBER(2.9) => floor]", "2")]
#[case("[NUMBER(-7.9) => integer]", "-7")]
#[case("[NUMBER(0.1) => add(0.2)]", "0.3")]
fn test_number_operations(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(eval(input), expected);
}

#[test]
fn test_number_divide_by_zero() {
    let err = Evaluator::new()
        .process("[NUMBER(1) => divide(0)]")
        .unwrap_err();
    assert!(matches!(err, EvalError::InvalidArgument { .. }));
}

#[test]
fn test_number_invalid_seed() {
    let err = Evaluator::new().process("[NUMBER(abc)]").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Conversion {
            keyword: TypeKeyword::Number,
            ref value,
            ..
        } if value == "abc"
    ));
}

// ============================================================================
// LIST
// ============================================================================

#[rstest]
#[case("[LIST(3,10,2) => ascending]", "2,3,10")]
#[case("[LIST(3,10,2) => descending]", "10,3,2")]
#[case("[LIST(b,a,C) => ascending]", "C,a,b")]
#[case("[LIST(a,b,c) => first]", "a")]
#[case("[LIST(a,b,c) => last]", "c")]
#[case("[LIST(a,b,c) => item(1)]", "b")]
#[case("[LIST(a,b,c) => item(-1)]", "c")]
#[case("[LIST(a,b,c) => size]", "3")]
#[case("[LIST() => size]", "0")]
#[case("[LIST(a,b) => append(c,d)]", "a,b,c,d")]
#[case("[LIST(c) => prepend(a,b)]", "a,b,c")]
#[case("[LIST(a,b) => insert(1,x)]", "a,x,b")]
#[case("[LIST(a,b,c) => remove(0)]", "b,c")]
#[case("[LIST(a,b,c,a) => removeItems(a,c)]", "b")]
#[case("[LIST(a,b,c) => replace(b,z)]", "a,z,c")]
#[case("[LIST(a,b,a) => distinct]", "a,b")]
#[case("[LIST(a,b,c) => reverse]", "c,b,a")]
#[case("[LIST(a,,b) => pack]", "a,b")]
#[case("[LIST(a,b) => contains(b)]", "true")]
#[case("[LIST(a,b,c) => index(c)]", "2")]
#[case("[LIST(a,b,c) => index(z)]", "-1")]
#[case("[LIST(a,b,c,d) => sublist(1,3)]", "b,c")]
#[case("[LIST(a,b) => join(-)]", "a-b")]
#[case("[LIST(1.5,2.5) => sum]", "4.0")]
#[case("[LIST(a,b,a) => count(a)]", "2")]
#[case(r"[LIST(a\,b,c) => size]", "2")]
#[case(r"[LIST(a\,b,c) => first]", "a,b")]
fn test_list_operations(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(eval(input), expected);
}

#[test]
fn test_list_item_out_of_range_leaves_expression() {
    assert_eq!(eval("[LIST(a) => item(5)]"), "[LIST(a) => item(5)]");
}

#[test]
fn test_list_item_non_numeric_index() {
    let err = Evaluator::new()
        .process("[LIST(a) => item(x)]")
        .unwrap_err();
    assert!(matches!(err, EvalError::InvalidArgument { .. }));
}

// ============================================================================
// JSON
// ============================================================================

#[rstest]
#[case(r#"[JSON({"a":{"b":[1,2,3]}}) => extract(a.b[1])]"#, "2")]
#[case(r#"[JSON({"user":{"name":"Ada"}}) => extract(user) extract(name)]"#, "Ada")]
#[case(r#"[JSON({"user":{"name":"Ada"}}) => extract(user.name) upper]"#, "ADA")]
#[case(r#"[JSON({"a":1,"b":2}) => keys]"#, "a,b")]
#[case(r#"[JSON({"items":[1,2,3]}) => count(items)]"#, "3")]
#[case(r#"[JSON({"tags":["x","y"]}) => list(tags)]"#, "x,y")]
#[case(r#"[JSON({"a":1}) => replace(a,2)]"#, r#"{"a":2}"#)]
#[case(r#"[JSON({"a":1}) => replace(b.c,"x")]"#, r#"{"a":1,"b":{"c":"x"}}"#)]
#[case(r#"[JSON({"a":1}) => replace(b,plain)]"#, r#"{"a":1,"b":"plain"}"#)]
#[case(r#"[JSON({"a":1,"b":2}) => remove(a)]"#, r#"{"b":2}"#)]
#[case(r#"[JSON( {"z":1, "a":2} )]"#, r#"{"z":1,"a":2}"#)]
#[case(r#"[JSON({"a":true}) => extract(a)]"#, "true")]
fn test_json_operations(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(eval(input), expected);
}

#[test]
fn test_json_beautify() {
    assert_eq!(
        eval(r#"[JSON({"a":[1,2]}) => beautify]"#),
        "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
    );
    assert_eq!(
        eval(r#"[JSON({"a":[1,2]}) => beautify compact]"#),
        r#"{"a":[1,2]}"#
    );
}

#[test]
fn test_json_missing_path_leaves_expression() {
    let input = r#"[JSON({"a":1}) => extract(b)]"#;
    assert_eq!(eval(input), input);
}

#[test]
fn test_json_null_extract_leaves_expression() {
    let input = r#"[JSON({"a":null}) => extract(a)]"#;
    assert_eq!(eval(input), input);
}

#[test]
fn test_json_invalid_seed() {
    let err = Evaluator::new().process("[JSON({)]").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Conversion {
            keyword: TypeKeyword::Json,
            ..
        }
    ));
}

// ============================================================================
// XML
// ============================================================================

const CATALOG: &str = r#"<catalog><book id="1"><title>A</title></book><book id="2"><title>B</title></book></catalog>"#;

fn xml(chain: &str) -> String {
    eval(&format!("[XML({}) => {}]", CATALOG, chain))
}

#[rstest]
#[case("extract(book[2]/title)", "B")]
#[case("extract(/catalog/book[1]/title)", "A")]
#[case("extract(book/@id)", "1")]
#[case("attribute(book[2],id)", "2")]
#[case("count(book)", "2")]
#[case("count(book/title)", "2")]
#[case("count(/other/book)", "0")]
#[case(
    "remove(book[1])",
    r#"<catalog><book id="2"><title>B</title></book></catalog>"#
)]
#[case(
    "remove(book/@id)",
    "<catalog><book><title>A</title></book><book><title>B</title></book></catalog>"
)]
#[case("extract(book[1])", "<book id=\"1\"><title>A</title></book>")]
fn test_xml_operations(#[case] chain: &str, #[case] expected: &str) {
    assert_eq!(xml(chain), expected);
}

#[test]
fn test_xml_missing_element_leaves_expression() {
    let input = format!("[XML({}) => extract(magazine)]", CATALOG);
    assert_eq!(eval(&input), input);
}

#[test]
fn test_xml_beautify() {
    assert_eq!(
        eval("[XML(<a><b>x</b><c/></a>) => beautify]"),
        "<a>\n  <b>x</b>\n  <c/>\n</a>"
    );
}

#[test]
fn test_xml_whitespace_and_entities() {
    assert_eq!(eval("[XML(<a>\n  <b>x</b>\n</a>) => compact]"), "<a><b>x</b></a>");
    assert_eq!(eval("[XML(<a>x &amp; y</a>)]"), "<a>x &amp; y</a>");
}

#[test]
fn test_xml_invalid_seed() {
    let err = Evaluator::new().process("[XML(<a><b></a>)]").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Conversion {
            keyword: TypeKeyword::Xml,
            ..
        }
    ));
}

// ============================================================================
// CSV
// ============================================================================

fn csv(chain: &str) -> String {
    eval(&format!("[CSV(name,age\nbob,30\nann,25) => {}]", chain))
}

#[rstest]
#[case("rowCount", "2")]
#[case("columnCount", "2")]
#[case("headers", "name,age")]
#[case("row(1)", "ann,25")]
#[case("column(age)", "30,25")]
#[case("column(0)", "bob,ann")]
#[case("filter(name,ann)", "name,age\nann,25")]
#[case("sortAscending(age)", "name,age\nann,25\nbob,30")]
#[case("sort-descending(name)", "name,age\nbob,30\nann,25")]
#[case("removeRows(0)", "name,age\nann,25")]
#[case("delimiter(;)", "name;age\nbob;30\nann;25")]
fn test_csv_operations(#[case] chain: &str, #[case] expected: &str) {
    assert_eq!(csv(chain), expected);
}

#[test]
fn test_csv_numeric_sort() {
    assert_eq!(
        eval("[CSV(n\n10\n9\n100) => sortAscending(n)]"),
        "n\n9\n10\n100"
    );
}

#[test]
fn test_csv_unknown_column() {
    let err = Evaluator::new()
        .process("[CSV(a\n1) => filter(b,1)]")
        .unwrap_err();
    assert!(matches!(err, EvalError::InvalidArgument { .. }));
}

// ============================================================================
// DATE
// ============================================================================

#[rstest]
#[case("[DATE(2024-01-31) => addMonth(1)]", "2024-02-29")]
#[case("[DATE(2024-03-14) => addDay(1)]", "2024-03-15")]
#[case("[DATE(03/14/2024) => addDay(-14)]", "02/29/2024")]
#[case("[DATE(2024-02-29) => addYear(1)]", "2025-02-28")]
#[case("[DATE(2024-03-14 09:30:00) => addHour(2) addMinute(15)]", "2024-03-14 11:45:00")]
#[case("[DATE(2024-03-14T09:30:00Z) => addSecond(30)]", "2024-03-14T09:30:30")]
#[case("[DATE(2024-03-14) => format(%d.%m.%Y)]", "14.03.2024")]
#[case("[DATE(2024-03-14) => dayOfWeek]", "Thursday")]
#[case("[DATE(1970-01-02) => epoch]", "86400000")]
#[case("[DATE(20240314) => addDay(1)]", "20240315")]
fn test_date_operations(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(eval(input), expected);
}

#[test]
fn test_date_from_epoch_millis() {
    assert_eq!(eval("[DATE(864000000) => format(%Y-%m-%d)]"), "1970-01-11");
}

#[test]
fn test_date_invalid_seed() {
    let err = Evaluator::new().process("[DATE(not a date)]").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Conversion {
            keyword: TypeKeyword::Date,
            ..
        }
    ));
}

// ============================================================================
// CONFIG / INI
// ============================================================================

const PROPERTIES: &str = "# server\nhost=localhost\nport: 8080";

#[rstest]
#[case("value(port)", "8080")]
#[case("set(port,9090)", "host=localhost\nport=9090")]
#[case("set(debug,true) keys", "host,port,debug")]
#[case("remove(host)", "port=8080")]
#[case("size", "2")]
fn test_config_operations(#[case] chain: &str, #[case] expected: &str) {
    assert_eq!(eval(&format!("[CONFIG({}) => {}]", PROPERTIES, chain)), expected);
}

const SETTINGS: &str = "; settings\nname=top\n[db]\nhost=x\nport=1\n[app]\ntitle=y";

#[rstest]
#[case("value(db,port)", "1")]
#[case("value(,name)", "top")]
#[case("sections", "db,app")]
#[case("keys(db)", "host,port")]
#[case("set(app,debug,true) value(app,debug)", "true")]
#[case("remove(db)", "name=top\n\n[app]\ntitle=y")]
#[case("remove(db,host)", "name=top\n\n[db]\nport=1\n\n[app]\ntitle=y")]
fn test_ini_operations(#[case] chain: &str, #[case] expected: &str) {
    assert_eq!(eval(&format!("[INI({}) => {}]", SETTINGS, chain)), expected);
}

// ============================================================================
// BINARY
// ============================================================================

#[rstest]
#[case("[BINARY(hi) => base64]", "aGk=")]
#[case("[BINARY(hi) => hex]", "6869")]
#[case("[BINARY(base64:aGk=) => utf8]", "hi")]
#[case("[BINARY(hex:ff00) => size]", "2")]
#[case("[BINARY(hex:ff00)]", "base64:/wA=")]
#[case("[BINARY(hex:4869)]", "Hi")]
fn test_binary_operations(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(eval(input), expected);
}

// ============================================================================
// External types
// ============================================================================

struct Canned;

impl Collaborator for Canned {
    fn fetch(&self, keyword: TypeKeyword, seed: &str) -> Result<ExternalPayload, String> {
        match (keyword, seed) {
            (_, "fail") => Ok(ExternalPayload {
                data: serde_json::Value::Null,
                error: Some("timeout".to_string()),
            }),
            (_, "bad") => Err("unusable seed".to_string()),
            (TypeKeyword::Sql, _) => Ok(ExternalPayload {
                data: json!([{"name": "ann"}, {"name": "bob"}]),
                error: None,
            }),
            _ => Ok(ExternalPayload {
                data: json!(format!("body of {}", seed)),
                error: None,
            }),
        }
    }
}

fn with_collaborators() -> Evaluator {
    let mut evaluator = Evaluator::new();
    evaluator
        .register_collaborator(TypeKeyword::Sql, Box::new(Canned))
        .register_collaborator(TypeKeyword::Web, Box::new(Canned));
    evaluator
}

#[rstest]
#[case("[SQL(select name from people) => size]", "2")]
#[case("[SQL(select name from people) => extract([1].name)]", "bob")]
#[case("[SQL(q)]", r#"[{"name":"ann"},{"name":"bob"}]"#)]
#[case("[SQL(q) => json count([0])]", "1")]
#[case("[WEB(page) => text upper]", "BODY OF PAGE")]
#[case("[WEB(page) => error]", "")]
#[case("[WEB(fail) => error]", "timeout")]
#[case("[WEB(fail)]", "timeout")]
fn test_external_operations(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(with_collaborators().process(input).unwrap(), expected);
}

#[test]
fn test_external_unknown_function_names_keyword() {
    let err = with_collaborators()
        .process("[WEB(page) => shout]")
        .unwrap_err();
    assert_eq!(
        err,
        EvalError::UnknownFunction {
            keyword: TypeKeyword::Web,
            name: "shout".to_string(),
        }
    );
}

#[test]
fn test_external_without_collaborator() {
    let err = with_collaborators().process("[EXCEL(Sheet1!A1)]").unwrap_err();
    assert!(matches!(
        err,
        EvalError::Conversion {
            keyword: TypeKeyword::Excel,
            ..
        }
    ));
}

#[test]
fn test_external_rejected_seed() {
    let err = with_collaborators().process("[SQL(bad)]").unwrap_err();
    assert!(matches!(err, EvalError::Conversion { ref reason, .. } if reason == "unusable seed"));
}

#[test]
fn test_external_keywords() {
    let external: Vec<TypeKeyword> = TypeKeyword::ALL
        .into_iter()
        .filter(TypeKeyword::is_external)
        .collect();
    assert_eq!(
        external,
        vec![TypeKeyword::Sql, TypeKeyword::Excel, TypeKeyword::Web]
    );
}

#[test]
fn test_external_value_keeps_error_beside_data() {
    let mut evaluator = with_collaborators();
    let expr = evaluator.parse("[WEB(fail)]", false).unwrap().unwrap();
    let Some(DataValue::External(value)) = expr.value else {
        panic!("expected an external value");
    };
    assert_eq!(value.data(), &serde_json::Value::Null);
    assert_eq!(value.error(), Some("timeout"));
}
