//! Pass registry and pipeline orchestration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::Instrument;

use crate::embed::{CodeEmbedPass, DEFAULT_CODE_HEIGHT};
use crate::fetch::BoxedFetcher;
use crate::frontmatter::{Frontmatter, FrontmatterPass};
use crate::html::to_html;
use crate::notes::{NoteIndex, PopupNotesPass};
use crate::parse::{Syntax, parse};
use crate::tree::Node;
use crate::{Error, Result};

/// One tree-rewriting traversal.
///
/// Passes hold configuration and capabilities only; everything they learn
/// about a document goes into the [`Document`] they are given.
pub trait Transform: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite `doc` in place.
    fn apply<'a>(&'a self, doc: &'a mut Document) -> BoxFuture<'a, Result<()>>;
}

/// The passes a pipeline can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Frontmatter,
    CodeEmbed,
    PopupNotes,
}

impl PassKind {
    /// Every pass, in the order they run by default.
    pub const ALL: [PassKind; 3] = [
        PassKind::Frontmatter,
        PassKind::CodeEmbed,
        PassKind::PopupNotes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PassKind::Frontmatter => "frontmatter",
            PassKind::CodeEmbed => "code_embed",
            PassKind::PopupNotes => "popup_notes",
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PassKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownPass(s.to_string()))
    }
}

/// What the code-embed pass does with a fetch that fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchErrorPolicy {
    /// Replace the directive with a warning and keep going
    #[default]
    Placeholder,
    /// Fail the whole document
    Fail,
}

impl FromStr for FetchErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "placeholder" => Ok(FetchErrorPolicy::Placeholder),
            "fail" => Ok(FetchErrorPolicy::Fail),
            other => Err(format!(
                "unknown fetch error policy `{other}` (expected `placeholder` or `fail`)"
            )),
        }
    }
}

/// Options shared by the passes of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Scroll box height for embeds without a `height` attribute
    pub default_code_height: String,
    /// Upper bound on in-flight fetches per document
    pub max_concurrent_fetches: usize,
    pub on_fetch_error: FetchErrorPolicy,
    /// Passes to run, in order
    pub passes: Vec<PassKind>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_code_height: DEFAULT_CODE_HEIGHT.to_string(),
            max_concurrent_fetches: 8,
            on_fetch_error: FetchErrorPolicy::Placeholder,
            passes: PassKind::ALL.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Replace the pass list with the named passes.
    ///
    /// Fails on the first name that is not a known pass.
    pub fn with_pass_names<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self> {
        self.passes = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<_>>()?;
        Ok(self)
    }
}

/// A document moving through a pipeline.
#[derive(Debug, Clone)]
pub struct Document {
    pub tree: Node,
    /// Set by the frontmatter pass
    pub frontmatter: Option<Frontmatter>,
    /// Set by the popup-notes pass
    pub notes: NoteIndex,
}

impl Document {
    pub fn new(tree: Node) -> Self {
        Self {
            tree,
            frontmatter: None,
            notes: NoteIndex::default(),
        }
    }

    pub fn parse(source: &str, syntax: Syntax) -> Result<Self> {
        Ok(Self::new(parse(source, syntax)?))
    }

    pub fn to_html(&self) -> String {
        to_html(&self.tree)
    }
}

/// Output of [`Pipeline::render`].
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub html: String,
    pub frontmatter: Option<Frontmatter>,
    pub notes: NoteIndex,
}

/// An ordered list of passes.
///
/// A pipeline keeps no per-document state and can render many documents
/// at once.
#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass.
    pub fn with_pass<T: Transform + 'static>(mut self, pass: T) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Build the passes named in `config`, in order.
    pub fn from_config(config: &PipelineConfig, fetcher: BoxedFetcher) -> Self {
        let mut pipeline = Self::new();
        for kind in &config.passes {
            pipeline = match kind {
                PassKind::Frontmatter => pipeline.with_pass(FrontmatterPass),
                PassKind::CodeEmbed => {
                    pipeline.with_pass(CodeEmbedPass::from_config(config, Arc::clone(&fetcher)))
                }
                PassKind::PopupNotes => pipeline.with_pass(PopupNotesPass),
            };
        }
        tracing::debug!(passes = ?pipeline.pass_names(), "built pipeline");
        pipeline
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Apply every pass once, in order.
    pub async fn run(&self, doc: &mut Document) -> Result<()> {
        for pass in &self.passes {
            let span = tracing::debug_span!("pass", name = pass.name());
            pass.apply(doc).instrument(span).await?;
        }
        Ok(())
    }

    /// Parse `source`, run the pipeline and serialize the result.
    pub async fn render(&self, source: &str, syntax: Syntax) -> Result<RenderedDocument> {
        let mut doc = Document::parse(source, syntax)?;
        self.run(&mut doc).await?;
        Ok(RenderedDocument {
            html: doc.to_html(),
            frontmatter: doc.frontmatter,
            notes: doc.notes,
        })
    }
}
