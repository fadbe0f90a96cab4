//! `inkpot build`: render every post under the content directory.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, WrapErr, eyre};
use futures::StreamExt;
use inkmark::{Pipeline, Syntax};

use crate::config::ResolvedConfig;

/// Documents rendered at once
const BUILD_CONCURRENCY: usize = 4;

/// Outcome of a build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub rendered: usize,
    pub drafts: usize,
    pub failed: Vec<Utf8PathBuf>,
}

/// A source file and where its HTML goes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Post {
    source: Utf8PathBuf,
    output: Utf8PathBuf,
    syntax: Syntax,
}

/// Find `.md`/`.mdx` files under `content_dir`, in a stable order.
fn discover_posts(content_dir: &Utf8Path, output_dir: &Utf8Path) -> Result<Vec<Post>> {
    if !content_dir.is_dir() {
        return Err(eyre!("Content directory {} does not exist", content_dir));
    }

    let mut posts = Vec::new();
    for entry in ignore::WalkBuilder::new(content_dir).build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(path) = Utf8PathBuf::try_from(entry.into_path()) else {
            tracing::warn!("skipping non UTF-8 path");
            continue;
        };
        let Some(syntax) = path.extension().and_then(Syntax::from_extension) else {
            continue;
        };
        let relative = path
            .strip_prefix(content_dir)
            .map_err(|_| eyre!("{} is outside {}", path, content_dir))?;
        posts.push(Post {
            output: output_dir.join(relative).with_extension("html"),
            source: path,
            syntax,
        });
    }
    posts.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(posts)
}

/// Render one post; returns whether it is a draft.
async fn render_post(pipeline: &Pipeline, post: &Post) -> Result<bool> {
    let source = fs_err::read_to_string(&post.source)?;
    let rendered = pipeline
        .render(&source, post.syntax)
        .await
        .wrap_err_with(|| format!("Failed to render {}", post.source))?;

    if let Some(parent) = post.output.parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(&post.output, rendered.html)?;

    let draft = rendered.frontmatter.as_ref().is_some_and(|fm| fm.draft);
    tracing::info!(
        source = %post.source,
        output = %post.output,
        draft,
        notes = rendered.notes.definitions.len(),
        "rendered"
    );
    Ok(draft)
}

/// Render all posts. A post that fails is logged and listed in the summary;
/// the other posts are still written.
pub async fn build(config: &ResolvedConfig, pipeline: Arc<Pipeline>) -> Result<BuildSummary> {
    let posts = discover_posts(&config.content_dir, &config.output_dir)?;
    tracing::info!(count = posts.len(), content = %config.content_dir, "building");

    let results: Vec<(Utf8PathBuf, Result<bool>)> = futures::stream::iter(posts)
        .map(|post| {
            let pipeline = Arc::clone(&pipeline);
            async move {
                let result = render_post(&pipeline, &post).await;
                (post.source, result)
            }
        })
        .buffer_unordered(BUILD_CONCURRENCY)
        .collect()
        .await;

    let mut summary = BuildSummary::default();
    for (source, result) in results {
        match result {
            Ok(draft) => {
                summary.rendered += 1;
                if draft {
                    summary.drafts += 1;
                }
            }
            Err(e) => {
                tracing::error!(source = %source, error = ?e, "render failed");
                summary.failed.push(source);
            }
        }
    }
    summary.failed.sort();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkmark::{FetchErrorPolicy, PipelineConfig, StaticFetcher};

    fn project() -> (tempfile::TempDir, ResolvedConfig) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let config = ResolvedConfig::defaults(&root);
        fs_err::create_dir_all(config.content_dir.join("2024")).unwrap();
        (dir, config)
    }

    fn pipeline(config: &PipelineConfig) -> Arc<Pipeline> {
        let fetcher = StaticFetcher::new().with("http://x/a.go", "package main");
        Arc::new(Pipeline::from_config(config, Arc::new(fetcher)))
    }

    #[tokio::test]
    async fn test_build_writes_html_per_post() {
        let (_dir, config) = project();
        let content = &config.content_dir;
        fs_err::write(
            content.join("hello.mdx"),
            "---\ntitle: Hello\n---\n\n<CodeEmbed url=\"http://x/a.go\" language=\"go\" />\n",
        )
        .unwrap();
        fs_err::write(
            content.join("2024/draft.md"),
            "---\ntitle: Soon\ndraft: true\n---\n\nNot yet.\n",
        )
        .unwrap();
        fs_err::write(content.join("notes.txt"), "ignored").unwrap();

        let summary = build(&config, pipeline(&config.pipeline)).await.unwrap();
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.drafts, 1);
        assert!(summary.failed.is_empty());

        let hello = fs_err::read_to_string(config.output_dir.join("hello.html")).unwrap();
        assert!(hello.contains("package main"));
        let draft = fs_err::read_to_string(config.output_dir.join("2024/draft.html")).unwrap();
        assert_eq!(draft, "<p>Not yet.</p>\n");
        assert!(!config.output_dir.join("notes.html").exists());
    }

    #[tokio::test]
    async fn test_failed_post_does_not_stop_build() {
        let (_dir, mut config) = project();
        config.pipeline.on_fetch_error = FetchErrorPolicy::Fail;
        let content = &config.content_dir;
        fs_err::write(content.join("ok.mdx"), "# Fine\n").unwrap();
        fs_err::write(content.join("broken.mdx"), "<CodeEmbed url=\"http://x/404\" />\n").unwrap();

        let summary = build(&config, pipeline(&config.pipeline)).await.unwrap();
        assert_eq!(summary.rendered, 1);
        assert_eq!(summary.failed, vec![content.join("broken.mdx")]);
        assert!(config.output_dir.join("ok.html").exists());
    }

    #[tokio::test]
    async fn test_missing_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let config = ResolvedConfig::defaults(&root);
        assert!(build(&config, pipeline(&config.pipeline)).await.is_err());
    }
}
