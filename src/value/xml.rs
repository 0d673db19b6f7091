use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::evaluator::EvalError;
use crate::output::XmlPrinter;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue, NumberValue, TextValue};

/// Element of a parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlChild>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlChild {
    Element(XmlNode),
    Text(String),
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("Invalid attribute in <{}>: {}", name, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| format!("Invalid attribute value in <{}>: {}", name, e))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(XmlNode {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|child| match child {
            XmlChild::Element(node) => Some(node),
            XmlChild::Text(_) => None,
        })
    }

    /// Concatenated text of this element and its descendants.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for child in &self.children {
            match child {
                XmlChild::Text(text) => result.push_str(text),
                XmlChild::Element(node) => result.push_str(&node.text()),
            }
        }
        result
    }

    fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }
}

/// One step of a slash-separated element path.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    /// Child elements named `name` (`*` matches any), optionally the n-th (1-based)
    Element { name: String, position: Option<usize> },
    /// Attribute of the selected elements
    Attribute(String),
}

fn parse_steps(path: &str) -> Result<Vec<Step>, String> {
    let mut steps = Vec::new();
    for raw in path.trim().split('/').filter(|s| !s.trim().is_empty()) {
        let raw = raw.trim();
        if let Some(attribute) = raw.strip_prefix('@') {
            steps.push(Step::Attribute(attribute.to_string()));
            continue;
        }
        let step = match raw.split_once('[') {
            Some((name, rest)) => {
                let index = rest
                    .strip_suffix(']')
                    .ok_or_else(|| format!("Missing ']' in path step '{}'", raw))?;
                let position = index
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| format!("Invalid position '{}' in path step '{}'", index, raw))?;
                Step::Element {
                    name: name.to_string(),
                    position: Some(position),
                }
            }
            None => Step::Element {
                name: raw.to_string(),
                position: None,
            },
        };
        steps.push(step);
    }

    if let Some(i) = steps.iter().position(|s| matches!(s, Step::Attribute(_)))
        && i + 1 != steps.len()
    {
        return Err(format!("Attribute step must be last in '{}'", path));
    }
    Ok(steps)
}

fn name_matches(pattern: &str, name: &str) -> bool {
    pattern == "*" || pattern == name
}

/// Parsed XML document.
///
/// Paths are slash separated and relative to the root element
/// (`book[2]/title`). A leading `/` makes the path absolute, so its first
/// step must name the root itself (`/catalog/book`). A trailing `@name`
/// step selects an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlValue {
    root: XmlNode,
    pretty: bool,
}

impl XmlValue {
    pub fn new(root: XmlNode) -> Self {
        XmlValue {
            root,
            pretty: false,
        }
    }

    pub fn root(&self) -> &XmlNode {
        &self.root
    }

    /// Steps relative to the root; `None` when an absolute path does not
    /// start at the root element.
    fn steps(&self, path: &str, function: &str) -> Result<Option<Vec<Step>>, EvalError> {
        let mut steps = parse_steps(path).map_err(|reason| EvalError::InvalidArgument {
            function: function.to_string(),
            reason,
        })?;

        if path.trim_start().starts_with('/') && !steps.is_empty() {
            let names_root = matches!(
                &steps[0],
                Step::Element { name, position }
                    if name_matches(name, &self.root.name) && position.unwrap_or(1) == 1
            );
            if !names_root {
                return Ok(None);
            }
            steps.remove(0);
        }
        Ok(Some(steps))
    }

    /// Elements selected by the element steps.
    fn select<'a>(&'a self, steps: &[Step]) -> Vec<&'a XmlNode> {
        let mut current = vec![&self.root];
        for step in steps {
            let Step::Element { name, position } = step else {
                break;
            };
            let mut next = Vec::new();
            for node in current {
                let matching = node.elements().filter(|child| name_matches(name, &child.name));
                match position {
                    Some(p) => next.extend(matching.skip(p - 1).take(1)),
                    None => next.extend(matching),
                }
            }
            current = next;
        }
        current
    }

    fn with(self) -> OpResult {
        Ok(Some(self.into_data()))
    }
}

impl DataType for XmlValue {
    fn parse(_keyword: TypeKeyword, text: &str, _ctx: &EvalContext<'_>) -> Result<Self, String> {
        let mut reader = Reader::from_str(text.trim());
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("Invalid XML at {}: {}", reader.buffer_position(), e))?;
            match event {
                Event::Start(start) => stack.push(XmlNode::from_start(&start)?),
                Event::Empty(start) => {
                    let node = XmlNode::from_start(&start)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack.pop().ok_or("Unexpected closing tag")?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| format!("Invalid text: {}", e))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlChild::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlChild::Text(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(format!("Unclosed element <{}>", open.name));
        }
        root.map(XmlValue::new)
            .ok_or_else(|| "XML document has no root element".to_string())
    }

    fn stringify(&self) -> Option<String> {
        Some(XmlPrinter::new(self.pretty).print(&self.root))
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Xml
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Xml(self)
    }
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlChild::Element(node));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(format!("Second root element <{}>", node.name)),
    }
}

static REGISTRY: LazyLock<Registry<XmlValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Xml, OPERATIONS));

const OPERATIONS: &[OpSpec<XmlValue>] = &[
    OpSpec::fixed("extract", 1, extract),
    OpSpec::fixed("attribute", 2, attribute),
    OpSpec::fixed("count", 1, count),
    OpSpec::fixed("remove", 1, remove),
    OpSpec::fixed("compact", 0, compact),
    OpSpec::fixed("beautify", 0, beautify),
];

/// Text of a leaf element, an attribute value, or the sub-document rooted
/// at a non-leaf element. Ends the chain when nothing matches.
fn extract(xml: XmlValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let Some(steps) = xml.steps(args.get_or(0, ""), "extract")? else {
        return Ok(None);
    };
    let Some(node) = xml.select(&steps).into_iter().next() else {
        return Ok(None);
    };

    if let Some(Step::Attribute(name)) = steps.last() {
        return Ok(node.attribute(name).map(|v| TextValue::new(v).into_data()));
    }
    if node.has_elements() {
        let mut sub = XmlValue::new(node.clone());
        sub.pretty = xml.pretty;
        return sub.with();
    }
    Ok(Some(TextValue::new(node.text()).into_data()))
}

fn attribute(xml: XmlValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let Some(steps) = xml.steps(args.get_or(0, ""), "attribute")? else {
        return Ok(None);
    };
    let name = args.required(1, "attribute")?;
    Ok(xml
        .select(&steps)
        .into_iter()
        .next()
        .and_then(|node| node.attribute(name))
        .map(|value| TextValue::new(value).into_data()))
}

fn count(xml: XmlValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let selected = match xml.steps(args.get_or(0, ""), "count")? {
        Some(steps) => {
            let selected = xml.select(&steps);
            match steps.last() {
                Some(Step::Attribute(name)) => selected
                    .iter()
                    .filter(|node| node.attribute(name).is_some())
                    .count(),
                _ => selected.len(),
            }
        }
        None => 0,
    };
    Ok(Some(NumberValue::from(selected as i64).into_data()))
}

/// Removes every element (or attribute) the path selects. The root itself
/// cannot be removed.
fn remove(mut xml: XmlValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    if let Some(steps) = xml.steps(args.get_or(0, ""), "remove")? {
        remove_steps(&mut xml.root, &steps);
    }
    xml.with()
}

fn remove_steps(node: &mut XmlNode, steps: &[Step]) {
    let Some((step, rest)) = steps.split_first() else {
        return;
    };

    match step {
        Step::Attribute(name) => node.attributes.retain(|(key, _)| key != name),
        Step::Element { name, position } => {
            let mut seen = 0;
            let mut kept = Vec::with_capacity(node.children.len());
            for child in std::mem::take(&mut node.children) {
                let XmlChild::Element(mut element) = child else {
                    kept.push(child);
                    continue;
                };
                if !name_matches(name, &element.name) {
                    kept.push(XmlChild::Element(element));
                    continue;
                }
                seen += 1;
                let selected = position.is_none_or(|p| p == seen);
                if selected && rest.is_empty() {
                    continue;
                }
                if selected {
                    remove_steps(&mut element, rest);
                }
                kept.push(XmlChild::Element(element));
            }
            node.children = kept;
        }
    }
}

fn compact(mut xml: XmlValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    xml.pretty = false;
    xml.with()
}

fn beautify(mut xml: XmlValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    xml.pretty = true;
    xml.with()
}
