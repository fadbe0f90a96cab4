//! Popup notes.
//!
//! A note is defined with a ```` ```note ```` fence and referenced with a
//! link to `#NOTE=<id>`:
//!
//! ````text
//! Rust has [affine types](#NOTE=affine).
//!
//! ```note affine
//! Values can be used at most once.
//! ```
//! ````
//!
//! The fence becomes a hidden `<pre>` carrying `noteid`, the link an anchor
//! carrying `noteref`. The id of a definition is the first word of the fence
//! meta; without one it is the definition's 1-based position among all note
//! fences.

use std::collections::BTreeMap;

use futures::future::BoxFuture;

use crate::Result;
use crate::pipeline::{Document, Transform};
use crate::tree::{Element, Node, NodeKind, TreePath};
use crate::visit::{Visit, visit_mut};

/// Fence language marking a note definition.
pub const NOTE_LANGUAGE: &str = "note";

/// Link url prefix marking a note reference.
pub const NOTE_URL_PREFIX: &str = "#NOTE=";

/// A rewritten note reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteReference {
    pub id: String,
    pub path: TreePath,
}

/// Notes found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteIndex {
    /// Definition id to the path of its hidden `pre`
    pub definitions: BTreeMap<String, TreePath>,
    /// References in document order
    pub references: Vec<NoteReference>,
    /// Referenced ids with no definition, in first-use order
    pub unresolved: Vec<String>,
}

impl NoteIndex {
    pub fn definition(&self, id: &str) -> Option<&TreePath> {
        self.definitions.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.references.is_empty()
    }
}

/// Rewrites note fences and `#NOTE=` links.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopupNotesPass;

impl PopupNotesPass {
    /// Rewrite every note in `tree` and index them.
    pub fn rewrite(&self, tree: &mut Node) -> NoteIndex {
        let mut index = NoteIndex::default();

        let mut position = 0usize;
        visit_mut(tree, NodeKind::Code, |node, location| {
            let Node::Code(code) = node else {
                return Visit::Continue;
            };
            if code.lang.as_deref() != Some(NOTE_LANGUAGE) {
                return Visit::Continue;
            }

            position += 1;
            let id = code
                .meta
                .as_deref()
                .and_then(|meta| meta.split_whitespace().next())
                .map(str::to_string)
                .unwrap_or_else(|| position.to_string());
            let body = std::mem::take(&mut code.value);

            *node = Node::MdxJsxFlowElement(
                Element::new("pre")
                    .with_attribute("className", "PopupNoteContentPre")
                    .with_attribute("hidden", true)
                    .with_attribute("noteid", id.as_str())
                    .with_children(vec![Node::MdxJsxFlowElement(
                        Element::new("code").with_children(vec![Node::text(body)]),
                    )]),
            );

            if index.definitions.insert(id.clone(), location.path()).is_some() {
                tracing::warn!(id = %id, "duplicate note definition, keeping the last one");
            }
            Visit::Skip
        });

        visit_mut(tree, NodeKind::Link, |node, location| {
            let Node::Link(link) = node else {
                return Visit::Continue;
            };
            let Some(id) = link.url.strip_prefix(NOTE_URL_PREFIX) else {
                return Visit::Continue;
            };
            let id = id.to_string();
            let children = std::mem::take(&mut link.children);

            *node = Node::MdxJsxTextElement(
                Element::new("a")
                    .with_attribute("className", "PopupNoteAnchor")
                    .with_attribute("noteref", id.as_str())
                    .with_children(children),
            );

            index.references.push(NoteReference {
                id,
                path: location.path(),
            });
            Visit::Continue
        });

        for reference in &index.references {
            if !index.definitions.contains_key(&reference.id)
                && !index.unresolved.contains(&reference.id)
            {
                tracing::debug!(id = %reference.id, "note reference without definition");
                index.unresolved.push(reference.id.clone());
            }
        }

        tracing::debug!(
            definitions = index.definitions.len(),
            references = index.references.len(),
            "rewrote popup notes"
        );
        index
    }
}

impl Transform for PopupNotesPass {
    fn name(&self) -> &'static str {
        "popup_notes"
    }

    fn apply<'a>(&'a self, doc: &'a mut Document) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            doc.notes = self.rewrite(&mut doc.tree);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Syntax, parse};
    use crate::tree::AttributeValue;

    #[test]
    fn test_definition_keeps_text_byte_for_byte() {
        let body = "  indented <b>not html</b> {braces}\n    & \"quotes\" [x](#NOTE=2)\n";
        let source = format!("```note\n{body}```\n");
        let mut tree = parse(&source, Syntax::Mdx).unwrap();
        let index = PopupNotesPass.rewrite(&mut tree);

        let pre = tree.children().unwrap()[0].as_element().unwrap();
        assert!(pre.is_named("pre"));
        assert_eq!(pre.attribute("className"), Some("PopupNoteContentPre"));
        assert_eq!(pre.attribute("hidden"), Some("true"));
        assert_eq!(pre.attribute("noteid"), Some("1"));

        let code = pre.children[0].as_element().unwrap();
        assert!(code.is_named("code"));
        // the fence value drops the final newline only
        assert_eq!(code.children, vec![Node::text(body.trim_end_matches('\n'))]);
        assert_eq!(index.definition("1"), Some(&TreePath::new(vec![0])));
    }

    #[test]
    fn test_reference_becomes_anchor() {
        let mut tree = parse("See [*this* note](#NOTE=1) here.\n", Syntax::Mdx).unwrap();
        let before = tree.children().unwrap()[0].children().unwrap()[1].clone();
        let index = PopupNotesPass.rewrite(&mut tree);

        let anchor = &tree.children().unwrap()[0].children().unwrap()[1];
        let Node::MdxJsxTextElement(element) = anchor else {
            panic!("expected anchor, got {anchor:?}");
        };
        assert!(element.is_named("a"));
        assert_eq!(element.attribute("className"), Some("PopupNoteAnchor"));
        assert_eq!(element.attribute("noteref"), Some("1"));
        assert_eq!(Some(&element.children), before.children());

        assert_eq!(index.references.len(), 1);
        assert_eq!(index.unresolved, vec!["1".to_string()]);
    }

    #[test]
    fn test_ids_from_meta_and_position() {
        let source = "\
[a](#NOTE=first) [b](#NOTE=2) [c](#NOTE=nope)

```note first extra words
one
```

```note
two
```
";
        let mut tree = parse(source, Syntax::Mdx).unwrap();
        let index = PopupNotesPass.rewrite(&mut tree);

        assert!(index.definition("first").is_some());
        assert!(index.definition("2").is_some());
        assert_eq!(index.unresolved, vec!["nope".to_string()]);
        assert_eq!(
            index.references.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["first", "2", "nope"]
        );
    }

    #[test]
    fn test_other_code_and_links_untouched() {
        let source = "```rust\nfn main() {}\n```\n\n[docs](https://docs.rs) and [top](#top)\n";
        let mut tree = parse(source, Syntax::Mdx).unwrap();
        let before = tree.clone();
        let index = PopupNotesPass.rewrite(&mut tree);
        assert_eq!(tree, before);
        assert!(index.is_empty());
    }

    #[test]
    fn test_hidden_is_a_boolean_attribute() {
        let mut tree = parse("```note\nx\n```\n", Syntax::Mdx).unwrap();
        PopupNotesPass.rewrite(&mut tree);
        let pre = tree.children().unwrap()[0].as_element().unwrap();
        let hidden = pre.attributes.iter().find_map(|item| match item {
            crate::tree::AttributeItem::Property(attr) if attr.name == "hidden" => {
                attr.value.clone()
            }
            _ => None,
        });
        assert_eq!(hidden, Some(AttributeValue::Bool(true)));
    }
}
