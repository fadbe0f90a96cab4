//! Frontmatter extraction.
//!
//! Supports both TOML (`+++`) and YAML (`---`) frontmatter. The parser turns
//! the block into a leading `toml`/`yaml` node; [`FrontmatterPass`] lifts it
//! out of the tree and into [`crate::Document::frontmatter`].

use facet::Facet;
use facet_value::Value;
use futures::future::BoxFuture;

use crate::pipeline::{Document, Transform};
use crate::tree::Node;
use crate::{Error, Result};

/// Parsed frontmatter of a post.
#[derive(Debug, Clone, Default, Facet)]
pub struct Frontmatter {
    #[facet(default)]
    pub title: String,

    /// Publication date, as written
    #[facet(default)]
    pub date: Option<String>,

    /// Last modification date, as written
    #[facet(default)]
    pub lastmod: Option<String>,

    #[facet(default)]
    pub tags: Vec<String>,

    /// Drafts are rendered but not meant to be published
    #[facet(default)]
    pub draft: bool,

    #[facet(default)]
    pub summary: Option<String>,

    /// Page layout name
    #[facet(default)]
    pub layout: Option<String>,

    #[facet(default)]
    pub slug: Option<String>,

    #[facet(default)]
    pub authors: Vec<String>,

    /// Additional custom fields
    #[facet(default)]
    pub extra: Value,
}

/// Type of frontmatter delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// TOML frontmatter delimited by `+++`
    Toml,
    /// YAML frontmatter delimited by `---`
    Yaml,
}

impl Frontmatter {
    /// Parse a raw frontmatter block (without delimiters).
    pub fn parse(raw: &str, format: FrontmatterFormat) -> Result<Self> {
        match format {
            FrontmatterFormat::Toml => facet_toml::from_str::<Frontmatter>(raw)
                .map_err(|e| Error::FrontmatterParse(format!("TOML: {}", e))),
            FrontmatterFormat::Yaml => facet_yaml::from_str::<Frontmatter>(raw)
                .map_err(|e| Error::FrontmatterParse(format!("YAML: {}", e))),
        }
    }
}

/// Removes the leading frontmatter node and parses it.
///
/// Documents without frontmatter are left untouched and keep
/// `frontmatter: None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontmatterPass;

impl FrontmatterPass {
    pub fn extract(&self, tree: &mut Node) -> Result<Option<Frontmatter>> {
        let Some(children) = tree.children_mut() else {
            return Ok(None);
        };

        if !matches!(children.first(), Some(Node::Yaml(_) | Node::Toml(_))) {
            return Ok(None);
        }

        let (raw, format) = match children.remove(0) {
            Node::Yaml(literal) => (literal.value, FrontmatterFormat::Yaml),
            Node::Toml(literal) => (literal.value, FrontmatterFormat::Toml),
            other => {
                children.insert(0, other);
                return Ok(None);
            }
        };

        let frontmatter = Frontmatter::parse(&raw, format)?;
        tracing::debug!(?format, title = %frontmatter.title, "extracted frontmatter");
        Ok(Some(frontmatter))
    }
}

impl Transform for FrontmatterPass {
    fn name(&self) -> &'static str {
        "frontmatter"
    }

    fn apply<'a>(&'a self, doc: &'a mut Document) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(frontmatter) = self.extract(&mut doc.tree)? {
                doc.frontmatter = Some(frontmatter);
            }
            Ok(())
        })
    }
}
