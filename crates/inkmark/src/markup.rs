//! Literal markup injection.

use crate::parse::parse_fragment;
use crate::tree::{Expression, Node};
use crate::{Error, Result};

/// Parse an MDX/JSX markup fragment into an expression node.
///
/// The node keeps the fragment text and its parsed tree, so serializers can
/// emit the fragment as regular tree content. A fragment written on one line
/// parses as a lone paragraph; its inline content is lifted out of it.
/// Invalid fragments are logged and returned as [`Error::Markup`].
pub fn parse_markup(text: &str) -> Result<Node> {
    match parse_fragment(text) {
        Ok(children) => Ok(Node::MdxFlowExpression(Expression {
            value: text.to_string(),
            tree: Some(lift_lone_paragraph(children)),
        })),
        Err(message) => {
            tracing::error!(fragment = text, error = %message, "markup parse error");
            Err(Error::Markup {
                fragment: text.to_string(),
                message,
            })
        }
    }
}

fn lift_lone_paragraph(mut children: Vec<Node>) -> Vec<Node> {
    if let [Node::Paragraph(_)] = children.as_slice()
        && let Some(Node::Paragraph(paragraph)) = children.pop()
    {
        return paragraph.children;
    }
    children
}

/// Escape text for use as MDX text content.
///
/// Every ASCII punctuation character gets a backslash escape, which MDX
/// decodes back in text. That covers `<` and `{` as well as emphasis, link
/// and escape markers.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if c.is_ascii_punctuation() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markup_keeps_text_and_tree() {
        let text = "<pre className=\"x\">\n  <code>hello</code>\n</pre>";
        let node = parse_markup(text).unwrap();
        let Node::MdxFlowExpression(expr) = &node else {
            panic!("expected expression, got {node:?}");
        };
        assert_eq!(expr.value, text);
        let tree = expr.tree.as_ref().unwrap();
        assert_eq!(tree.len(), 1);
        let pre = tree[0].as_element().unwrap();
        assert!(pre.is_named("pre"));
        assert_eq!(pre.attribute("className"), Some("x"));
        assert_eq!(node_text(&tree[0]), "hello");
    }

    fn node_text(node: &Node) -> String {
        node.text_content()
    }

    #[test]
    fn test_parse_markup_error_propagates() {
        let err = parse_markup("<pre><code>unclosed</pre>").unwrap_err();
        match err {
            Error::Markup { fragment, .. } => assert_eq!(fragment, "<pre><code>unclosed</pre>"),
            other => panic!("expected markup error, got {other:?}"),
        }
    }

    #[test]
    fn test_escaped_text_round_trips() {
        let url = "https://x/{a}<b>&c";
        let text = format!("<p>{}</p>", escape_text(url));
        let node = parse_markup(&text).unwrap();
        let Node::MdxFlowExpression(expr) = node else {
            unreachable!()
        };
        let tree = expr.tree.unwrap();
        assert_eq!(tree[0].text_content(), url);
    }

    #[test]
    fn test_markdown_punctuation_is_kept_literally() {
        for url in [
            "http://x/dir\\",
            "http://x/*a*",
            "http://x/_b_",
            "http://x/[a](b)",
            "http://x/`tick`",
            "http://x/a&amp;b",
        ] {
            let text = format!("<code>{}</code>", escape_text(url));
            let Node::MdxFlowExpression(expr) = parse_markup(&text).unwrap() else {
                unreachable!()
            };
            assert_eq!(expr.tree.unwrap()[0].text_content(), url, "{text}");
        }
    }

    #[test]
    fn test_one_line_fragment_is_lifted_out_of_paragraph() {
        let node = parse_markup("<pre className=\"w\"><code>hi</code></pre>").unwrap();
        let Node::MdxFlowExpression(expr) = node else {
            unreachable!()
        };
        let tree = expr.tree.unwrap();
        assert_eq!(tree.len(), 1);
        let pre = tree[0].as_element().unwrap();
        assert!(pre.is_named("pre"));
        assert!(pre.children[0].as_element().unwrap().is_named("code"));
        assert_eq!(tree[0].text_content(), "hi");
    }
}
