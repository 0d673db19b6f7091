/// One function group split off a chain by the lexer.
///
/// # Examples
/// ```text
/// upper            // name "upper", params None
/// append(x,y)      // name "append", params Some("x,y")
/// replace  (a, b)  // name "replace", params Some("a, b")
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChainToken {
    /// Function name, trimmed
    pub name: String,

    /// Raw text between the group's outer parentheses, still encoded.
    /// `None` when the function was written without parentheses.
    pub params: Option<String>,

    /// Exact text consumed for this group, including inner whitespace
    pub source: String,
}

impl ChainToken {
    pub fn bare(name: impl Into<String>) -> Self {
        let name = name.into();
        ChainToken {
            source: name.clone(),
            name,
            params: None,
        }
    }
}
