//! Function-chain lexer.
//!
//! Splits the text after `=>` into `name(params)` groups. Input is expected
//! to be encoded by [`EscapeCodec`](crate::escape::EscapeCodec) already, so
//! escaped parentheses arrive as placeholders and never affect the
//! parenthesis count.
//!
//! Grouping rules, applied left to right on what remains:
//!
//! - a bare word not followed by `(` is a function without parameters
//!   (`ascending descending` is two calls);
//! - whitespace between a name and its `(` is allowed;
//! - a parameter list ends at the `)` that brings the count back to zero,
//!   so literal parentheses inside an argument are fine as long as they
//!   pair up.

use thiserror::Error;
use tracing::trace;

use crate::ast::ChainToken;

/// Format errors in a function chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unbalanced ')' in '{name}' at position {position}")]
    UnbalancedParen { name: String, position: usize },

    #[error("Unterminated parameter list for '{name}' starting at position {position}")]
    Unterminated { name: String, position: usize },

    #[error("Missing function name before '(' at position {position}")]
    MissingName { position: usize },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Splits a whole chain into groups.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeflow::lexer::Lexer;
    ///
    /// let groups = Lexer::tokenize("ascending() first").unwrap();
    /// assert_eq!(groups.len(), 2);
    /// assert_eq!(groups[0].name, "ascending");
    /// assert_eq!(groups[1].params, None);
    /// ```
    pub fn tokenize(chain: &str) -> Result<Vec<ChainToken>, LexError> {
        let mut lexer = Lexer::new(chain);
        let mut groups = Vec::new();
        while let Some(group) = lexer.next_group()? {
            groups.push(group);
        }
        Ok(groups)
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

    fn slice(&self, start: usize, end: usize) -> String {
        self.input[start..end].iter().collect()
    }

    /// Text not yet consumed.
    pub fn remainder(&self) -> String {
        self.slice(self.position, self.input.len())
    }

    fn read_name(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || ch == '(' {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    /// Reads a balanced `( ... )` group and returns the text between the
    /// outer parentheses. Positioned on the opening `(` when called.
    fn read_params(&mut self, name: &str) -> Result<String, LexError> {
        let open = self.position;
        let mut depth = 0usize;

        while let Some(ch) = self.current_char() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let params = self.slice(open + 1, self.position);
                        self.advance();
                        return Ok(params);
                    }
                }
                _ => {}
            }
            self.advance();
        }

        Err(LexError::Unterminated {
            name: name.to_string(),
            position: open,
        })
    }

    pub fn next_group(&mut self) -> Result<Option<ChainToken>, LexError> {
        self.skip_whitespace();

        let start = self.position;
        match self.current_char() {
            None => return Ok(None),
            Some('(') => return Err(LexError::MissingName { position: start }),
            Some(_) => {}
        }

        let name = self.read_name();
        if let Some(offset) = name.find(')') {
            return Err(LexError::UnbalancedParen {
                position: start + name[..offset].chars().count(),
                name,
            });
        }

        let after_name = self.position;
        self.skip_whitespace();

        let group = if self.current_char() == Some('(') {
            let params = self.read_params(&name)?;
            ChainToken {
                source: self.slice(start, self.position),
                name,
                params: Some(params),
            }
        } else {
            // bare function; whitespace belongs to the next group
            self.position = after_name;
            ChainToken::bare(name)
        };

        trace!(name = %group.name, params = ?group.params, "Lexed chain group");
        Ok(Some(group))
    }
}
