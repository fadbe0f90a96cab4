//! # inkmark
//!
//! MDX document transforms for a blog generator.
//!
//! inkmark parses Markdown/MDX into an owned document tree, runs an ordered
//! pipeline of tree-rewriting passes over it, and serializes the result to HTML:
//! - **Frontmatter**: YAML (`---`) or TOML (`+++`) metadata is lifted out of the tree
//! - **Code embeds**: `<CodeEmbed url="..." />` directives are replaced by the
//!   fetched file, rendered as a titled, scrollable code block
//! - **Popup notes**: ```` ```note ```` fences become hidden note bodies and
//!   `[label](#NOTE=id)` links become anchors that reveal them
//!
//! ## Example
//!
//! ```text
//! use std::sync::Arc;
//! use inkmark::{HttpFetcher, Pipeline, PipelineConfig, Syntax};
//!
//! let fetcher = Arc::new(HttpFetcher::new()?);
//! let pipeline = Pipeline::from_config(&PipelineConfig::default(), fetcher);
//! let rendered = pipeline.render(source, Syntax::Mdx).await?;
//!
//! println!("{}", rendered.html);
//! ```

mod attrs;
mod embed;
mod fetch;
mod frontmatter;
mod html;
mod markup;
mod notes;
mod parse;
mod pipeline;
mod tree;
mod visit;

pub use attrs::{get_attribute, get_attribute_or, get_attribute_parsed};
pub use embed::{CODE_EMBED_NAME, CodeEmbedPass, DEFAULT_CODE_HEIGHT, DEFAULT_LANGUAGE};
pub use fetch::{BoxedFetcher, FetchError, FetchErrorKind, Fetcher, HttpFetcher, StaticFetcher};
pub use frontmatter::{Frontmatter, FrontmatterFormat, FrontmatterPass};
pub use html::to_html;
pub use markup::parse_markup;
pub use notes::{NOTE_LANGUAGE, NOTE_URL_PREFIX, NoteIndex, NoteReference, PopupNotesPass};
pub use parse::{Syntax, parse};
pub use pipeline::{
    Document, FetchErrorPolicy, PassKind, Pipeline, PipelineConfig, RenderedDocument, Transform,
};
pub use tree::{
    Attribute, AttributeItem, AttributeValue, Code, Element, Expression, Heading, Image, Link,
    List, ListItem, Literal, Node, NodeKind, Other, Parent, TreePath,
};
pub use visit::{Location, Visit, visit_mut, visit_mut_where};

/// Error type for inkmark operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document source is not valid Markdown/MDX
    #[error("markdown parse error: {0}")]
    Markdown(String),

    /// A markup fragment could not be parsed
    #[error("markup parse error in `{fragment}`: {message}")]
    Markup { fragment: String, message: String },

    /// A remote resource could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Frontmatter parsing failed
    #[error("frontmatter parse error: {0}")]
    FrontmatterParse(String),

    /// A pass name that is not in the registry
    #[error("unknown transform pass: {0}")]
    UnknownPass(String),
}

/// Result type alias for inkmark operations.
pub type Result<T> = std::result::Result<T, Error>;
