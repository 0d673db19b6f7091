//! XML serialization for parsed documents.
//!
//! This module renders an [`XmlNode`] tree back to text in either compact or
//! pretty-printed form. Attribute order and child order are preserved exactly
//! as parsed.
//!
//! # Features
//!
//! - **Compact output** - no whitespace between elements
//! - **Pretty output** - one element per line with 2-space indentation;
//!   elements holding only text stay on a single line
//! - **Escaping** - text and attribute values are escaped with
//!   [`quick_xml::escape::escape`]
//!
//! # Examples
//!
//! ```
//! use typeflow::output::XmlPrinter;
//! use typeflow::value::{XmlChild, XmlNode};
//!
//! let node = XmlNode {
//!     name: "a".into(),
//!     attributes: vec![("id".into(), "1".into())],
//!     children: vec![XmlChild::Text("x & y".into())],
//! };
//!
//! assert_eq!(XmlPrinter::new(false).print(&node), r#"<a id="1">x &amp; y</a>"#);
//! ```

use quick_xml::escape::escape;

use crate::value::{XmlChild, XmlNode};

pub struct XmlPrinter {
    pretty: bool,
}

impl XmlPrinter {
    pub fn new(pretty: bool) -> Self {
        XmlPrinter { pretty }
    }

    pub fn print(&self, node: &XmlNode) -> String {
        let mut out = String::new();
        self.print_node(node, 0, &mut out);
        out
    }

    fn print_node(&self, node: &XmlNode, indent: usize, out: &mut String) {
        out.push('<');
        out.push_str(&node.name);
        for (key, value) in &node.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if node.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let text_only = node
            .children
            .iter()
            .all(|child| matches!(child, XmlChild::Text(_)));

        if !self.pretty || text_only {
            for child in &node.children {
                match child {
                    XmlChild::Text(text) => out.push_str(&escape(text.as_str())),
                    XmlChild::Element(element) => self.print_node(element, indent, out),
                }
            }
        } else {
            for child in &node.children {
                out.push('\n');
                out.push_str(&self.indent(indent + 1));
                match child {
                    XmlChild::Text(text) => out.push_str(&escape(text.as_str())),
                    XmlChild::Element(element) => self.print_node(element, indent + 1, out),
                }
            }
            out.push('\n');
            out.push_str(&self.indent(indent));
        }

        out.push_str("</");
        out.push_str(&node.name);
        out.push('>');
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}
