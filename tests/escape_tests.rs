// tests/escape_tests.rs

use pretty_assertions::assert_eq;
use rstest::rstest;
use typeflow::escape::{EscapeCodec, Restore};

#[rstest]
#[case(r"a\,b")]
#[case(r"f\(x\)")]
#[case(r"list\]")]
#[case(r"plain text")]
#[case(r"trailing \")]
#[case(r"\n is not escapable")]
fn test_encode_decode_is_lossless(#[case] text: &str) {
    let codec = EscapeCodec::new(',');
    assert_eq!(codec.decode(&codec.encode(text), Restore::Escaped), text);
}

#[test]
fn test_encoded_text_hides_structure() {
    let codec = EscapeCodec::new(',');
    let encoded = codec.encode(r"\(\)\,\]");
    assert!(!encoded.contains(['(', ')', ',', ']', '\\']));
    assert_eq!(encoded.chars().count(), 4);
    assert!(encoded.chars().all(|c| codec.is_placeholder(c)));
}

#[test]
fn test_unescape() {
    let codec = EscapeCodec::new(',');
    assert_eq!(codec.unescape(r"a\,b \(c\)"), "a,b (c)");
    assert_eq!(codec.unescape(r"C:\temp"), r"C:\temp");
}

#[test]
fn test_custom_delimiter_is_escapable() {
    let codec = EscapeCodec::new(';');
    assert_eq!(codec.unescape(r"a\;b\,c"), "a;b,c");

    let comma = EscapeCodec::default();
    assert_eq!(comma.unescape(r"a\;b"), r"a\;b");
}

#[test]
fn test_unescaped_structure_untouched() {
    let codec = EscapeCodec::new(',');
    assert_eq!(codec.encode("f(a,b)"), "f(a,b)");
}

// ============================================================================
// Private-use characters in the text
// ============================================================================

#[test]
fn test_placeholders_avoid_text_characters() {
    let text = "\u{E000}\u{E001}\u{E002} a\\,b";
    let codec = EscapeCodec::avoiding(',', text);

    assert!(text.chars().all(|c| !codec.is_placeholder(c)));
    assert_eq!(codec.decode(&codec.encode(text), Restore::Escaped), text);
    assert_eq!(
        codec.decode(&codec.encode(text), Restore::Literal),
        "\u{E000}\u{E001}\u{E002} a,b"
    );
}

#[test]
fn test_unescape_keeps_private_use_characters() {
    let codec = EscapeCodec::new(',');
    assert_eq!(codec.unescape("\u{E002}\\,\u{E003}"), "\u{E002},\u{E003}");
}
