/// A single operation call in a chain: a name and its positional arguments.
///
/// Arguments are already split and unescaped. `source` keeps the text the
/// call was parsed from (escapes intact) so the expression can be written
/// back out.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
    pub source: String,
}

impl Invocation {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        let name = name.into();
        let source = if args.is_empty() {
            name.clone()
        } else {
            format!("{}({})", name, args.join(","))
        };
        Invocation { name, args, source }
    }
}
