//! Markdown/MDX source to document tree.
//!
//! Parsing is delegated to markdown-rs; its mdast is converted into the
//! owned [`Node`] model the transform passes work on.

use markdown::mdast;
use markdown::{Constructs, ParseOptions};

use crate::tree::{
    Attribute, AttributeItem, AttributeValue, Code, Element, Expression, Heading, Image, Link,
    List, ListItem, Literal, Node, Other, Parent,
};
use crate::{Error, Result};

/// Source syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// MDX: JSX elements and `{expressions}`, no raw HTML
    #[default]
    Mdx,
    /// CommonMark + GFM with raw HTML
    Markdown,
}

impl Syntax {
    /// Pick a syntax from a file extension (`md`, `markdown` or `mdx`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mdx" => Some(Syntax::Mdx),
            "md" | "markdown" => Some(Syntax::Markdown),
            _ => None,
        }
    }

    fn options(self) -> ParseOptions {
        let base = match self {
            Syntax::Mdx => ParseOptions::mdx(),
            Syntax::Markdown => ParseOptions::gfm(),
        };
        let constructs = Constructs {
            frontmatter: true,
            gfm_strikethrough: true,
            gfm_table: true,
            gfm_task_list_item: true,
            ..base.constructs.clone()
        };
        ParseOptions { constructs, ..base }
    }
}

/// Parse a whole document, front-matter included, into a tree.
pub fn parse(source: &str, syntax: Syntax) -> Result<Node> {
    let mdast = markdown::to_mdast(source, &syntax.options())
        .map_err(|message| Error::Markdown(message.to_string()))?;
    Ok(convert(mdast))
}

/// Parse an MDX fragment without front-matter support.
pub(crate) fn parse_fragment(source: &str) -> std::result::Result<Vec<Node>, String> {
    let mdast = markdown::to_mdast(source, &ParseOptions::mdx()).map_err(|m| m.to_string())?;
    match convert(mdast) {
        Node::Root(root) => Ok(root.children),
        other => Ok(vec![other]),
    }
}

fn convert_all(children: Vec<mdast::Node>) -> Vec<Node> {
    children.into_iter().map(convert).collect()
}

fn parent(children: Vec<mdast::Node>) -> Parent {
    Parent::new(convert_all(children))
}

fn other(kind: &'static str, children: Vec<Node>) -> Node {
    Node::Other(Other { kind, children })
}

fn convert(node: mdast::Node) -> Node {
    match node {
        mdast::Node::Root(n) => Node::Root(parent(n.children)),
        mdast::Node::Paragraph(n) => Node::Paragraph(parent(n.children)),
        mdast::Node::Heading(n) => Node::Heading(Heading {
            depth: n.depth,
            children: convert_all(n.children),
        }),
        mdast::Node::Blockquote(n) => Node::Blockquote(parent(n.children)),
        mdast::Node::List(n) => Node::List(List {
            ordered: n.ordered,
            start: n.start,
            children: convert_all(n.children),
        }),
        mdast::Node::ListItem(n) => Node::ListItem(ListItem {
            checked: n.checked,
            children: convert_all(n.children),
        }),
        mdast::Node::Emphasis(n) => Node::Emphasis(parent(n.children)),
        mdast::Node::Strong(n) => Node::Strong(parent(n.children)),
        mdast::Node::Delete(n) => Node::Delete(parent(n.children)),
        mdast::Node::Table(n) => Node::Table(parent(n.children)),
        mdast::Node::TableRow(n) => Node::TableRow(parent(n.children)),
        mdast::Node::TableCell(n) => Node::TableCell(parent(n.children)),
        mdast::Node::Text(n) => Node::Text(Literal::new(n.value)),
        mdast::Node::InlineCode(n) => Node::InlineCode(Literal::new(n.value)),
        mdast::Node::InlineMath(n) => Node::InlineCode(Literal::new(n.value)),
        mdast::Node::Code(n) => Node::Code(Code {
            lang: n.lang,
            meta: n.meta,
            value: n.value,
        }),
        mdast::Node::Math(n) => Node::Code(Code {
            lang: Some("math".to_string()),
            meta: n.meta,
            value: n.value,
        }),
        mdast::Node::Link(n) => Node::Link(Link {
            url: n.url,
            title: n.title,
            children: convert_all(n.children),
        }),
        mdast::Node::LinkReference(n) => other("linkReference", convert_all(n.children)),
        mdast::Node::Image(n) => Node::Image(Image {
            url: n.url,
            alt: n.alt,
            title: n.title,
        }),
        mdast::Node::ImageReference(n) => other("imageReference", vec![Node::text(n.alt)]),
        mdast::Node::Html(n) => Node::Html(Literal::new(n.value)),
        mdast::Node::Break(_) => Node::Break,
        mdast::Node::ThematicBreak(_) => Node::ThematicBreak,
        mdast::Node::Yaml(n) => Node::Yaml(Literal::new(n.value)),
        mdast::Node::Toml(n) => Node::Toml(Literal::new(n.value)),
        mdast::Node::MdxJsxFlowElement(n) => {
            Node::MdxJsxFlowElement(element(n.name, n.attributes, n.children))
        }
        mdast::Node::MdxJsxTextElement(n) => {
            Node::MdxJsxTextElement(element(n.name, n.attributes, n.children))
        }
        mdast::Node::MdxFlowExpression(n) => Node::MdxFlowExpression(Expression {
            value: n.value,
            tree: None,
        }),
        mdast::Node::MdxTextExpression(n) => Node::MdxTextExpression(Expression {
            value: n.value,
            tree: None,
        }),
        mdast::Node::MdxjsEsm(n) => Node::MdxjsEsm(Literal::new(n.value)),
        mdast::Node::FootnoteDefinition(n) => other("footnoteDefinition", convert_all(n.children)),
        mdast::Node::FootnoteReference(_) => other("footnoteReference", Vec::new()),
        mdast::Node::Definition(_) => other("definition", Vec::new()),
        #[allow(unreachable_patterns)]
        _ => other("unknown", Vec::new()),
    }
}

fn element(
    name: Option<String>,
    attributes: Vec<mdast::AttributeContent>,
    children: Vec<mdast::Node>,
) -> Element {
    Element {
        name,
        attributes: attributes.into_iter().map(attribute).collect(),
        children: convert_all(children),
    }
}

fn attribute(content: mdast::AttributeContent) -> AttributeItem {
    match content {
        mdast::AttributeContent::Property(prop) => AttributeItem::Property(Attribute {
            name: prop.name,
            value: prop.value.map(|value| match value {
                mdast::AttributeValue::Literal(s) => AttributeValue::Literal(s),
                mdast::AttributeValue::Expression(expr) => AttributeValue::Expression(expr.value),
            }),
        }),
        mdast::AttributeContent::Expression(expr) => AttributeItem::Spread(expr.value),
    }
}
