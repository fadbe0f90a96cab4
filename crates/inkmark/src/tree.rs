//! Document tree.
//!
//! An owned model of the mdast convention. Node names reported by
//! [`NodeKind::as_str`] match mdast (`code`, `link`, `mdxJsxFlowElement`, ...),
//! so trees can be compared against what other mdast tooling produces.

use std::fmt;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Root(Parent),
    Paragraph(Parent),
    Heading(Heading),
    Blockquote(Parent),
    List(List),
    ListItem(ListItem),
    Emphasis(Parent),
    Strong(Parent),
    Delete(Parent),
    Table(Parent),
    TableRow(Parent),
    TableCell(Parent),
    Text(Literal),
    InlineCode(Literal),
    Code(Code),
    Link(Link),
    Image(Image),
    Html(Literal),
    Break,
    ThematicBreak,
    Yaml(Literal),
    Toml(Literal),
    MdxJsxFlowElement(Element),
    MdxJsxTextElement(Element),
    MdxFlowExpression(Expression),
    MdxTextExpression(Expression),
    MdxjsEsm(Literal),
    /// Constructs kept only for their content (footnotes, references, definitions)
    Other(Other),
}

/// Discriminant of a [`Node`], used by visitors to select nodes by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading,
    Blockquote,
    List,
    ListItem,
    Emphasis,
    Strong,
    Delete,
    Table,
    TableRow,
    TableCell,
    Text,
    InlineCode,
    Code,
    Link,
    Image,
    Html,
    Break,
    ThematicBreak,
    Yaml,
    Toml,
    MdxJsxFlowElement,
    MdxJsxTextElement,
    MdxFlowExpression,
    MdxTextExpression,
    MdxjsEsm,
    Other,
}

impl NodeKind {
    /// The mdast type name.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::Blockquote => "blockquote",
            NodeKind::List => "list",
            NodeKind::ListItem => "listItem",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Delete => "delete",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tableRow",
            NodeKind::TableCell => "tableCell",
            NodeKind::Text => "text",
            NodeKind::InlineCode => "inlineCode",
            NodeKind::Code => "code",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
            NodeKind::Html => "html",
            NodeKind::Break => "break",
            NodeKind::ThematicBreak => "thematicBreak",
            NodeKind::Yaml => "yaml",
            NodeKind::Toml => "toml",
            NodeKind::MdxJsxFlowElement => "mdxJsxFlowElement",
            NodeKind::MdxJsxTextElement => "mdxJsxTextElement",
            NodeKind::MdxFlowExpression => "mdxFlowExpression",
            NodeKind::MdxTextExpression => "mdxTextExpression",
            NodeKind::MdxjsEsm => "mdxjsEsm",
            NodeKind::Other => "other",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node that only carries children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parent {
    pub children: Vec<Node>,
}

impl Parent {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }
}

/// A node that only carries a string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Literal {
    pub value: String,
}

impl Literal {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// 1 through 6
    pub depth: u8,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub start: Option<u32>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Task list state, `None` for plain items
    pub checked: Option<bool>,
    pub children: Vec<Node>,
}

/// A fenced or indented code block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    pub lang: Option<String>,
    pub meta: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub url: String,
    pub title: Option<String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub alt: String,
    pub title: Option<String>,
}

/// An MDX expression (`{...}`).
///
/// Expressions produced by [`crate::parse_markup`] also carry the parsed form
/// of their source, which serializers emit in place of the raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub value: String,
    pub tree: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Other {
    /// mdast type name of the original construct
    pub kind: &'static str,
    pub children: Vec<Node>,
}

/// A custom element: a JSX element in MDX, or an element synthesized by a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// `None` for fragments (`<>...</>`)
    pub name: Option<String>,
    pub attributes: Vec<AttributeItem>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append a property attribute.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.push(AttributeItem::Property(Attribute {
            name: name.into(),
            value: Some(value.into()),
        }));
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Read an attribute; see [`crate::get_attribute`].
    pub fn attribute(&self, name: &str) -> Option<&str> {
        crate::attrs::get_attribute(self, name)
    }
}

/// One entry in an element's attribute list.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeItem {
    /// `name="value"`, `name={expr}` or a bare `name`
    Property(Attribute),
    /// `{...spread}`, kept as source text
    Spread(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    /// `None` for a bare attribute
    pub value: Option<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Literal(String),
    Bool(bool),
    /// Wrapped expression; holds the expression source
    Expression(String),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Literal(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Literal(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Literal::new(value))
    }

    pub fn root(children: Vec<Node>) -> Self {
        Node::Root(Parent::new(children))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::Paragraph(_) => NodeKind::Paragraph,
            Node::Heading(_) => NodeKind::Heading,
            Node::Blockquote(_) => NodeKind::Blockquote,
            Node::List(_) => NodeKind::List,
            Node::ListItem(_) => NodeKind::ListItem,
            Node::Emphasis(_) => NodeKind::Emphasis,
            Node::Strong(_) => NodeKind::Strong,
            Node::Delete(_) => NodeKind::Delete,
            Node::Table(_) => NodeKind::Table,
            Node::TableRow(_) => NodeKind::TableRow,
            Node::TableCell(_) => NodeKind::TableCell,
            Node::Text(_) => NodeKind::Text,
            Node::InlineCode(_) => NodeKind::InlineCode,
            Node::Code(_) => NodeKind::Code,
            Node::Link(_) => NodeKind::Link,
            Node::Image(_) => NodeKind::Image,
            Node::Html(_) => NodeKind::Html,
            Node::Break => NodeKind::Break,
            Node::ThematicBreak => NodeKind::ThematicBreak,
            Node::Yaml(_) => NodeKind::Yaml,
            Node::Toml(_) => NodeKind::Toml,
            Node::MdxJsxFlowElement(_) => NodeKind::MdxJsxFlowElement,
            Node::MdxJsxTextElement(_) => NodeKind::MdxJsxTextElement,
            Node::MdxFlowExpression(_) => NodeKind::MdxFlowExpression,
            Node::MdxTextExpression(_) => NodeKind::MdxTextExpression,
            Node::MdxjsEsm(_) => NodeKind::MdxjsEsm,
            Node::Other(_) => NodeKind::Other,
        }
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Root(p)
            | Node::Paragraph(p)
            | Node::Blockquote(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p)
            | Node::Table(p)
            | Node::TableRow(p)
            | Node::TableCell(p) => Some(&p.children),
            Node::Heading(h) => Some(&h.children),
            Node::List(l) => Some(&l.children),
            Node::ListItem(i) => Some(&i.children),
            Node::Link(l) => Some(&l.children),
            Node::MdxJsxFlowElement(e) | Node::MdxJsxTextElement(e) => Some(&e.children),
            Node::Other(o) => Some(&o.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(p)
            | Node::Paragraph(p)
            | Node::Blockquote(p)
            | Node::Emphasis(p)
            | Node::Strong(p)
            | Node::Delete(p)
            | Node::Table(p)
            | Node::TableRow(p)
            | Node::TableCell(p) => Some(&mut p.children),
            Node::Heading(h) => Some(&mut h.children),
            Node::List(l) => Some(&mut l.children),
            Node::ListItem(i) => Some(&mut i.children),
            Node::Link(l) => Some(&mut l.children),
            Node::MdxJsxFlowElement(e) | Node::MdxJsxTextElement(e) => Some(&mut e.children),
            Node::Other(o) => Some(&mut o.children),
            _ => None,
        }
    }

    /// The element behind either JSX element variant.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::MdxJsxFlowElement(e) | Node::MdxJsxTextElement(e) => Some(e),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Node::Text(t) | Node::InlineCode(t) => out.push_str(&t.value),
            Node::Code(c) => out.push_str(&c.value),
            Node::Image(i) => out.push_str(&i.alt),
            _ => {
                if let Some(children) = self.children() {
                    for child in children {
                        child.push_text(out);
                    }
                }
            }
        }
    }

    pub fn get(&self, path: &TreePath) -> Option<&Node> {
        let mut node = self;
        for &index in &path.0 {
            node = node.children()?.get(index)?;
        }
        Some(node)
    }

    pub fn get_mut(&mut self, path: &TreePath) -> Option<&mut Node> {
        let mut node = self;
        for &index in &path.0 {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Replace the node at `path`, returning the previous node.
    ///
    /// Sibling indices are unchanged, so paths captured before the
    /// replacement stay valid unless they point inside the replaced node.
    pub fn replace(&mut self, path: &TreePath, replacement: Node) -> Option<Node> {
        let slot = self.get_mut(path)?;
        Some(std::mem::replace(slot, replacement))
    }
}

/// Location of a node, as child indices walked down from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath(pub Vec<usize>);

impl TreePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Whether `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &TreePath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}
