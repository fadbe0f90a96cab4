//! Code embeds: `<CodeEmbed url="..." />` directives resolved into fetched code.

use std::sync::Arc;

use futures::StreamExt;
use futures::future::BoxFuture;

use crate::attrs::{get_attribute, get_attribute_or, get_attribute_parsed};
use crate::fetch::{BoxedFetcher, FetchError};
use crate::markup::{escape_text, parse_markup};
use crate::pipeline::{Document, FetchErrorPolicy, PipelineConfig, Transform};
use crate::tree::{Code, Element, Node, TreePath};
use crate::visit::{Visit, visit_mut_where};
use crate::{Error, Result};

/// Element name of the directive.
pub const CODE_EMBED_NAME: &str = "CodeEmbed";

/// Language used when the directive does not name one.
pub const DEFAULT_LANGUAGE: &str = "ts";

/// Maximum height of the scroll box when neither directive nor config sets one.
pub const DEFAULT_CODE_HEIGHT: &str = "300px";

/// An embed waiting for its fetch to finish.
#[derive(Debug, Clone, PartialEq)]
struct PendingEmbed {
    path: TreePath,
    /// Written inside a paragraph, so the replacement must be phrasing content
    inline: bool,
    url: String,
    language: String,
    title: String,
    height: String,
    /// First displayed line number
    line_start: Option<usize>,
    /// 1-based first line of the fetched file to keep
    start_line: Option<usize>,
    num_lines: Option<usize>,
}

impl PendingEmbed {
    fn from_element(
        element: &Element,
        path: TreePath,
        inline: bool,
        default_height: &str,
    ) -> Self {
        let start_line = get_attribute_parsed::<usize>(element, "startLine");
        Self {
            path,
            inline,
            url: get_attribute_or(element, "url", "").to_string(),
            language: get_attribute_or(element, "language", DEFAULT_LANGUAGE).to_string(),
            title: get_attribute_or(element, "title", "").to_string(),
            height: get_attribute_or(element, "height", default_height).to_string(),
            line_start: get_attribute_parsed::<usize>(element, "lineStart").or(start_line),
            start_line,
            num_lines: get_attribute_parsed::<usize>(element, "numLines"),
        }
    }

    /// Keep only the requested window of lines.
    fn slice<'a>(&self, body: &'a str) -> std::borrow::Cow<'a, str> {
        if self.start_line.is_none() && self.num_lines.is_none() {
            return body.into();
        }
        let skip = self.start_line.unwrap_or(1).saturating_sub(1);
        let take = self.num_lines.unwrap_or(usize::MAX);
        body.lines()
            .skip(skip)
            .take(take)
            .collect::<Vec<_>>()
            .join("\n")
            .into()
    }

    fn link(&self) -> Node {
        Node::MdxJsxTextElement(
            Element::new("a")
                .with_attribute("className", "CodeEmbedUrlLink")
                .with_attribute("href", self.url.as_str())
                .with_children(vec![Node::text(self.title.as_str())]),
        )
    }

    fn replacement(&self, body: &str) -> Node {
        if self.inline {
            return self.inline_replacement(body);
        }

        let meta = match self.line_start {
            Some(start) => format!("showLineNumbers={start}"),
            None => "showLineNumbers".to_string(),
        };

        let heading = Element::new("h4")
            .with_attribute("className", "CodeEmbedHeading")
            .with_children(vec![self.link()]);
        let scroller = Element::new("div")
            .with_attribute(
                "style",
                format!("max-height: {}; overflow: scroll;", self.height),
            )
            .with_children(vec![Node::Code(Code {
                lang: Some(self.language.clone()),
                meta: Some(meta),
                value: self.slice(body).into_owned(),
            })]);

        Node::MdxJsxFlowElement(
            Element::new("div")
                .with_attribute("className", "CodeEmbedContainer")
                .with_children(vec![
                    Node::MdxJsxFlowElement(heading),
                    Node::MdxJsxFlowElement(scroller),
                ]),
        )
    }

    /// `span.CodeEmbedInline > [a.CodeEmbedUrlLink, code.language-*]`
    fn inline_replacement(&self, body: &str) -> Node {
        let code = Element::new("code")
            .with_attribute("className", format!("language-{}", self.language))
            .with_children(vec![Node::text(self.slice(body))]);
        Node::MdxJsxTextElement(
            Element::new("span")
                .with_attribute("className", "CodeEmbedInline")
                .with_children(vec![self.link(), Node::MdxJsxTextElement(code)]),
        )
    }
}

fn is_code_embed(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| element.is_named(CODE_EMBED_NAME))
}

/// The fragment shown in place of an embed that cannot be loaded.
///
/// Block embeds get a `pre`, embeds inside a paragraph a bare `code`.
fn warning(url: &str, inline: bool) -> Node {
    let message = format!("Unable to load url {url}");
    let fragment = if inline {
        format!(
            "<code className=\"CodeEmbedWarning\">{}</code>",
            escape_text(&message)
        )
    } else {
        format!(
            "<pre className=\"CodeEmbedWarning\"><code>{}</code></pre>",
            escape_text(&message)
        )
    };

    match parse_markup(&fragment) {
        Ok(Node::MdxFlowExpression(expr)) if inline => Node::MdxTextExpression(expr),
        Ok(node) => node,
        // escaped text always parses; same shape built by hand otherwise
        Err(_) => {
            let code = Element::new("code").with_children(vec![Node::text(message)]);
            if inline {
                Node::MdxJsxTextElement(code.with_attribute("className", "CodeEmbedWarning"))
            } else {
                Node::MdxJsxFlowElement(
                    Element::new("pre")
                        .with_attribute("className", "CodeEmbedWarning")
                        .with_children(vec![Node::MdxJsxTextElement(code)]),
                )
            }
        }
    }
}

/// Replaces `CodeEmbed` directives with the code they point at.
pub struct CodeEmbedPass {
    fetcher: BoxedFetcher,
    default_height: String,
    max_concurrent_fetches: usize,
    on_fetch_error: FetchErrorPolicy,
}

impl CodeEmbedPass {
    /// Create a pass with default settings.
    pub fn new(fetcher: BoxedFetcher) -> Self {
        Self::from_config(&PipelineConfig::default(), fetcher)
    }

    pub fn from_config(config: &PipelineConfig, fetcher: BoxedFetcher) -> Self {
        Self {
            fetcher,
            default_height: config.default_code_height.clone(),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
            on_fetch_error: config.on_fetch_error,
        }
    }

    /// Resolve every embed in `tree`.
    ///
    /// Embeds without a url are replaced during the walk. The others are
    /// fetched concurrently, at most `max_concurrent_fetches` at a time, and
    /// all fetches settle before any node is replaced.
    pub async fn resolve(&self, tree: &mut Node) -> Result<()> {
        let pending = self.collect(tree);
        if pending.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = pending.len(), "fetching code embeds");
        let requests: Vec<(usize, String)> = pending
            .iter()
            .map(|embed| embed.url.clone())
            .enumerate()
            .collect();
        let mut results: Vec<(usize, std::result::Result<String, FetchError>)> =
            futures::stream::iter(requests)
                .map(|(i, url)| {
                    let fetcher = Arc::clone(&self.fetcher);
                    async move {
                        let result = fetcher.fetch(&url).await;
                        (i, result)
                    }
                })
                .buffer_unordered(self.max_concurrent_fetches)
                .collect()
                .await;
        results.sort_by_key(|(i, _)| *i);

        if self.on_fetch_error == FetchErrorPolicy::Fail
            && let Some(index) = results.iter().position(|(_, r)| r.is_err())
        {
            let (_, result) = results.swap_remove(index);
            if let Err(e) = result {
                return Err(Error::Fetch(e));
            }
        }

        // Reverse document order: nested embeds go before their ancestors.
        for (embed, (_, result)) in pending.iter().zip(results).rev() {
            let replacement = match result {
                Ok(body) => {
                    tracing::info!(url = %embed.url, language = %embed.language, "embedded code");
                    embed.replacement(&body)
                }
                Err(e) => {
                    tracing::warn!(
                        url = %embed.url,
                        error = %e,
                        "code embed failed, using placeholder"
                    );
                    warning(&embed.url, embed.inline)
                }
            };
            tree.replace(&embed.path, replacement);
        }

        Ok(())
    }

    fn collect(&self, tree: &mut Node) -> Vec<PendingEmbed> {
        let mut pending = Vec::new();

        visit_mut_where(tree, is_code_embed, |node, location| {
            let inline = matches!(node, Node::MdxJsxTextElement(_));
            let Some(element) = node.as_element() else {
                return Visit::Continue;
            };

            if get_attribute(element, "url").is_none() {
                tracing::warn!(path = %location.path(), "code embed without url");
                *node = warning("", inline);
                return Visit::Skip;
            }

            pending.push(PendingEmbed::from_element(
                element,
                location.path(),
                inline,
                &self.default_height,
            ));
            Visit::Continue
        });

        pending
    }
}

impl Transform for CodeEmbedPass {
    fn name(&self) -> &'static str {
        "code_embed"
    }

    fn apply<'a>(&'a self, doc: &'a mut Document) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.resolve(&mut doc.tree))
    }
}
