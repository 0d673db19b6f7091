//! Reversible escaping of structural characters.
//!
//! Expression text uses `(`, `)`, `,` and `]` as structure. A script author
//! who needs one of them as plain data writes it with a leading backslash
//! (`\(`, `\)`, `\,`, `\]`). Before any scanning happens the codec swaps each
//! escaped pair for a single private-use placeholder character, so the
//! tokenizer never mistakes it for structure. Once splitting is done the
//! placeholders are turned back into either the literal character or the
//! original escaped pair.
//!
//! Placeholders are picked from code points absent from the text being
//! encoded (see [`EscapeCodec::avoiding`]), so private-use characters that
//! already occur in the text pass through untouched.
//!
//! # Examples
//!
//! ```
//! use typeflow::escape::{EscapeCodec, Restore};
//!
//! let codec = EscapeCodec::new(',');
//! let encoded = codec.encode(r"a\,b,c");
//! assert_eq!(encoded.split(',').count(), 2);
//! assert_eq!(codec.decode(&encoded, Restore::Literal), "a,b,c");
//! assert_eq!(codec.decode(&encoded, Restore::Escaped), r"a\,b,c");
//! ```

use std::collections::HashSet;

/// Characters that always carry structure inside an expression.
const STRUCTURAL: [char; 4] = ['(', ')', ',', ']'];

/// Private use areas placeholders are drawn from, in order.
const PRIVATE_USE: [(u32, u32); 2] = [(0xE000, 0xF8FF), (0xF0000, 0xFFFFD)];

/// How placeholders are turned back into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// Drop the backslash: the text is final argument data.
    Literal,
    /// Keep the backslash: the text will be structurally parsed again.
    Escaped,
}

/// Bidirectional table between escapable characters and their placeholders.
#[derive(Debug, Clone)]
pub struct EscapeCodec {
    delimiter: char,
    table: Vec<(char, char)>,
}

impl EscapeCodec {
    /// Builds the table for the structural set plus `delimiter`, using the
    /// first private-use code points.
    pub fn new(delimiter: char) -> Self {
        Self::avoiding(delimiter, "")
    }

    /// Like [`new`](Self::new), but no placeholder is a character that
    /// occurs in `text`. Encoding and decoding `text` with this codec is
    /// lossless whatever characters it contains.
    ///
    /// ```
    /// use typeflow::escape::{EscapeCodec, Restore};
    ///
    /// let text = "\u{E002} a\\,b";
    /// let codec = EscapeCodec::avoiding(',', text);
    /// assert_eq!(codec.decode(&codec.encode(text), Restore::Escaped), text);
    /// assert_eq!(codec.decode(&codec.encode(text), Restore::Literal), "\u{E002} a,b");
    /// ```
    pub fn avoiding(delimiter: char, text: &str) -> Self {
        let mut escapable: Vec<char> = STRUCTURAL.to_vec();
        if !escapable.contains(&delimiter) {
            escapable.push(delimiter);
        }

        let taken: HashSet<char> = text.chars().filter(|c| is_private_use(*c)).collect();
        let free = PRIVATE_USE
            .iter()
            .flat_map(|&(first, last)| first..=last)
            .filter_map(char::from_u32)
            .filter(|c| !taken.contains(c));
        let table = escapable.into_iter().zip(free).collect();

        EscapeCodec { delimiter, table }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    fn placeholder_for(&self, c: char) -> Option<char> {
        self.table.iter().find(|(s, _)| *s == c).map(|(_, p)| *p)
    }

    fn structural_for(&self, p: char) -> Option<char> {
        self.table.iter().find(|(_, ph)| *ph == p).map(|(s, _)| *s)
    }

    /// Returns true when `c` is one of this codec's placeholders.
    pub fn is_placeholder(&self, c: char) -> bool {
        self.structural_for(c).is_some()
    }

    /// Replaces every `\X` (X escapable) with X's placeholder.
    pub fn encode(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == '\\'
                && let Some(next) = chars.peek()
                && let Some(placeholder) = self.placeholder_for(*next)
            {
                result.push(placeholder);
                chars.next();
                continue;
            }
            result.push(ch);
        }

        result
    }

    /// Exact inverse of [`encode`](Self::encode) under [`Restore::Escaped`];
    /// [`Restore::Literal`] yields the bare character instead.
    pub fn decode(&self, text: &str, restore: Restore) -> String {
        let mut result = String::with_capacity(text.len());

        for ch in text.chars() {
            match self.structural_for(ch) {
                Some(original) => {
                    if restore == Restore::Escaped {
                        result.push('\\');
                    }
                    result.push(original);
                }
                None => result.push(ch),
            }
        }

        result
    }

    /// Turns escaped pairs in plain (not yet encoded) text into literals.
    pub fn unescape(&self, text: &str) -> String {
        let codec = Self::avoiding(self.delimiter, text);
        codec.decode(&codec.encode(text), Restore::Literal)
    }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    PRIVATE_USE
        .iter()
        .any(|&(first, last)| (first..=last).contains(&code))
}

impl Default for EscapeCodec {
    fn default() -> Self {
        EscapeCodec::new(',')
    }
}
