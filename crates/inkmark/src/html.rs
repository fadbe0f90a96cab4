//! HTML serialization of a document tree.

use crate::tree::{AttributeItem, AttributeValue, Code, Element, Node};

/// Elements written as `<name />` with no closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta", "source", "wbr"];

/// Render a tree to HTML.
///
/// Front-matter, ESM and bare expressions produce no output; expressions
/// carrying a parsed tree render that tree.
pub fn to_html(node: &Node) -> String {
    let mut html = String::new();
    write_node(&mut html, node);
    html
}

fn write_children(html: &mut String, children: &[Node]) {
    for child in children {
        write_node(html, child);
    }
}

fn write_wrapped(html: &mut String, tag: &str, children: &[Node]) {
    html.push_str(&format!("<{tag}>"));
    write_children(html, children);
    html.push_str(&format!("</{tag}>"));
}

fn write_node(html: &mut String, node: &Node) {
    match node {
        Node::Root(root) => write_children(html, &root.children),
        Node::Paragraph(p) => {
            write_wrapped(html, "p", &p.children);
            html.push('\n');
        }
        Node::Heading(h) => {
            write_wrapped(html, &format!("h{}", h.depth), &h.children);
            html.push('\n');
        }
        Node::Blockquote(b) => {
            html.push_str("<blockquote>\n");
            write_children(html, &b.children);
            html.push_str("</blockquote>\n");
        }
        Node::List(list) => {
            let tag = if list.ordered { "ol" } else { "ul" };
            match list.start {
                Some(start) if list.ordered && start != 1 => {
                    html.push_str(&format!("<ol start=\"{start}\">\n"))
                }
                _ => html.push_str(&format!("<{tag}>\n")),
            }
            write_children(html, &list.children);
            html.push_str(&format!("</{tag}>\n"));
        }
        Node::ListItem(item) => {
            html.push_str("<li>");
            match item.checked {
                Some(true) => html.push_str("<input type=\"checkbox\" disabled checked /> "),
                Some(false) => html.push_str("<input type=\"checkbox\" disabled /> "),
                None => {}
            }
            // a lone paragraph is written without its <p>
            match item.children.as_slice() {
                [Node::Paragraph(p)] => write_children(html, &p.children),
                children => {
                    html.push('\n');
                    write_children(html, children);
                }
            }
            html.push_str("</li>\n");
        }
        Node::Emphasis(p) => write_wrapped(html, "em", &p.children),
        Node::Strong(p) => write_wrapped(html, "strong", &p.children),
        Node::Delete(p) => write_wrapped(html, "del", &p.children),
        Node::Table(table) => write_table(html, &table.children),
        Node::TableRow(row) => write_row(html, &row.children, "td"),
        Node::TableCell(cell) => write_wrapped(html, "td", &cell.children),
        Node::Text(t) => html.push_str(&html_escape::encode_text(&t.value)),
        Node::InlineCode(c) => {
            html.push_str("<code>");
            html.push_str(&html_escape::encode_text(&c.value));
            html.push_str("</code>");
        }
        Node::Code(code) => write_code(html, code),
        Node::Link(link) => {
            html.push_str(&format!("<a href=\"{}\"", attr(&link.url)));
            if let Some(title) = &link.title {
                html.push_str(&format!(" title=\"{}\"", attr(title)));
            }
            html.push('>');
            write_children(html, &link.children);
            html.push_str("</a>");
        }
        Node::Image(image) => {
            html.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\"",
                attr(&image.url),
                attr(&image.alt)
            ));
            if let Some(title) = &image.title {
                html.push_str(&format!(" title=\"{}\"", attr(title)));
            }
            html.push_str(" />");
        }
        Node::Html(raw) => html.push_str(&raw.value),
        Node::Break => html.push_str("<br />\n"),
        Node::ThematicBreak => html.push_str("<hr />\n"),
        Node::Yaml(_) | Node::Toml(_) | Node::MdxjsEsm(_) => {}
        Node::MdxJsxFlowElement(element) => {
            write_element(html, element);
            html.push('\n');
        }
        Node::MdxJsxTextElement(element) => write_element(html, element),
        Node::MdxFlowExpression(expr) => {
            if let Some(tree) = &expr.tree {
                let start = html.len();
                write_children(html, tree);
                if html.len() > start && !html.ends_with('\n') {
                    html.push('\n');
                }
            }
        }
        Node::MdxTextExpression(expr) => {
            if let Some(tree) = &expr.tree {
                write_children(html, tree);
            }
        }
        Node::Other(other) => write_children(html, &other.children),
    }
}

fn attr(value: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

fn write_table(html: &mut String, rows: &[Node]) {
    html.push_str("<table>\n");
    if let Some((head, body)) = rows.split_first() {
        html.push_str("<thead>\n");
        if let Some(cells) = head.children() {
            write_row(html, cells, "th");
        }
        html.push_str("</thead>\n");
        if !body.is_empty() {
            html.push_str("<tbody>\n");
            write_children(html, body);
            html.push_str("</tbody>\n");
        }
    }
    html.push_str("</table>\n");
}

fn write_row(html: &mut String, cells: &[Node], cell_tag: &str) {
    html.push_str("<tr>\n");
    for cell in cells {
        write_wrapped(html, cell_tag, cell.children().map(Vec::as_slice).unwrap_or_default());
        html.push('\n');
    }
    html.push_str("</tr>\n");
}

/// Line numbering requested by a code meta string: `None` when off,
/// `Some(start)` when on.
fn line_numbers(meta: Option<&str>) -> Option<Option<&str>> {
    meta?.split_whitespace().find_map(|token| {
        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (token, None),
        };
        (key == "showLineNumbers").then_some(value)
    })
}

fn write_code(html: &mut String, code: &Code) {
    html.push_str("<pre");
    if let Some(start) = line_numbers(code.meta.as_deref()) {
        html.push_str(" class=\"line-numbers\"");
        if let Some(start) = start {
            html.push_str(&format!(" data-start=\"{}\"", attr(start)));
        }
    }
    html.push_str("><code");
    if let Some(lang) = &code.lang {
        html.push_str(&format!(" class=\"language-{}\"", attr(lang)));
    }
    html.push('>');
    html.push_str(&html_escape::encode_text(&code.value));
    if !code.value.is_empty() {
        html.push('\n');
    }
    html.push_str("</code></pre>\n");
}

fn write_element(html: &mut String, element: &Element) {
    let Some(name) = element.name.as_deref() else {
        write_children(html, &element.children);
        return;
    };

    html.push('<');
    html.push_str(name);
    for item in &element.attributes {
        let AttributeItem::Property(attribute) = item else {
            continue;
        };
        let key = match attribute.name.as_str() {
            "className" => "class",
            "htmlFor" => "for",
            other => other,
        };
        match &attribute.value {
            None | Some(AttributeValue::Bool(true)) => {
                html.push(' ');
                html.push_str(key);
            }
            Some(AttributeValue::Bool(false)) => {}
            Some(AttributeValue::Literal(value) | AttributeValue::Expression(value)) => {
                html.push_str(&format!(" {key}=\"{}\"", attr(value)));
            }
        }
    }

    if VOID_ELEMENTS.contains(&name) && element.children.is_empty() {
        html.push_str(" />");
        return;
    }

    html.push('>');
    write_children(html, &element.children);
    html.push_str(&format!("</{name}>"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Syntax, parse};
    use crate::tree::{Literal, Parent};

    fn render(source: &str) -> String {
        to_html(&parse(source, Syntax::Mdx).unwrap())
    }

    #[test]
    fn test_basic_blocks() {
        assert_eq!(
            render("# Hello\n\nWorld *here*.\n"),
            "<h1>Hello</h1>\n<p>World <em>here</em>.</p>\n"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let tree = Node::root(vec![Node::Paragraph(Parent::new(vec![Node::text(
            "a < b & c",
        )]))]);
        assert_eq!(to_html(&tree), "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn test_code_with_line_numbers() {
        let tree = Node::root(vec![Node::Code(Code {
            lang: Some("go".into()),
            meta: Some("showLineNumbers=12".into()),
            value: "if a < b {}".into(),
        })]);
        assert_eq!(
            to_html(&tree),
            "<pre class=\"line-numbers\" data-start=\"12\"><code class=\"language-go\">if a &lt; b {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_element_attributes() {
        let element = Element::new("pre")
            .with_attribute("className", "PopupNoteContentPre")
            .with_attribute("hidden", true)
            .with_attribute("open", false)
            .with_attribute("title", "\"quoted\"")
            .with_children(vec![Node::text("x")]);
        assert_eq!(
            to_html(&Node::MdxJsxTextElement(element)),
            "<pre class=\"PopupNoteContentPre\" hidden title=\"&quot;quoted&quot;\">x</pre>"
        );
    }

    #[test]
    fn test_frontmatter_and_bare_expressions_render_nothing() {
        let tree = Node::root(vec![
            Node::Yaml(Literal::new("title: x")),
            Node::MdxFlowExpression(crate::tree::Expression {
                value: "1 + 1".into(),
                tree: None,
            }),
        ]);
        assert_eq!(to_html(&tree), "");
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(
            render("- one\n- two\n"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_line_numbers_meta() {
        assert_eq!(line_numbers(None), None);
        assert_eq!(line_numbers(Some("title=x")), None);
        assert_eq!(line_numbers(Some("showLineNumbers")), Some(None));
        assert_eq!(line_numbers(Some("a showLineNumbers=3")), Some(Some("3")));
    }

    #[test]
    fn test_one_line_markup_renders_as_a_block() {
        let tree = Node::root(vec![
            crate::markup::parse_markup("<pre className=\"w\"><code>x</code></pre>").unwrap(),
            Node::Paragraph(Parent::new(vec![Node::text("after")])),
        ]);
        assert_eq!(
            to_html(&tree),
            "<pre class=\"w\"><code>x</code></pre>\n<p>after</p>\n"
        );
    }
}
