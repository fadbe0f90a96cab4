//! inkpot: render MDX blog posts to HTML

mod build;
mod config;

use std::env;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use eyre::{Result, WrapErr};
use facet::Facet;
use facet_args as args;
use inkmark::{BoxedFetcher, HttpFetcher, Pipeline, StaticFetcher, Syntax};
use owo_colors::OwoColorize;

use crate::config::ResolvedConfig;

/// Render one document to stdout
#[derive(Facet, Debug)]
struct RenderArgs {
    /// Markdown or MDX file to render
    #[facet(args::positional)]
    file: String,

    /// Do not fetch code embeds; every embed renders its placeholder
    #[facet(args::named)]
    offline: bool,
}

/// Render every post under the content directory
#[derive(Facet, Debug)]
struct BuildArgs {
    /// Do not fetch code embeds; every embed renders its placeholder
    #[facet(args::named)]
    offline: bool,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Render one document to stdout
    Render(RenderArgs),
    /// Render every post under the content directory
    Build(BuildArgs),
}

#[derive(Facet, Debug)]
struct InkpotArgs {
    #[facet(args::subcommand)]
    command: Command,
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let parsed: InkpotArgs = facet_args::from_slice(&args_refs).map_err(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        "Failed to parse arguments".to_string()
    })?;

    Ok(parsed.command)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("inkpot=info,inkmark=info")),
        )
        .init();
}

fn fetcher(config: &ResolvedConfig, offline: bool) -> Result<BoxedFetcher> {
    if offline {
        tracing::info!("offline: code embeds will not be fetched");
        return Ok(Arc::new(StaticFetcher::new()));
    }
    let fetcher =
        HttpFetcher::with_timeout(config.fetch_timeout).wrap_err("Failed to create HTTP client")?;
    Ok(Arc::new(fetcher))
}

async fn run_render(args: RenderArgs) -> Result<()> {
    let config = ResolvedConfig::discover()?;
    let pipeline = Pipeline::from_config(&config.pipeline, fetcher(&config, args.offline)?);

    let path = Utf8PathBuf::from(args.file);
    let syntax = path
        .extension()
        .and_then(Syntax::from_extension)
        .unwrap_or_default();
    let source = fs_err::read_to_string(&path)?;

    let rendered = pipeline
        .render(&source, syntax)
        .await
        .wrap_err_with(|| format!("Failed to render {path}"))?;

    if let Some(frontmatter) = &rendered.frontmatter {
        tracing::info!(title = %frontmatter.title, "rendered");
    }
    for id in &rendered.notes.unresolved {
        tracing::warn!(id = %id, "note reference without a definition");
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.html.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

async fn run_build(args: BuildArgs) -> Result<bool> {
    let config = ResolvedConfig::discover()?;
    let pipeline = Arc::new(Pipeline::from_config(
        &config.pipeline,
        fetcher(&config, args.offline)?,
    ));

    let summary = build::build(&config, pipeline).await?;
    eprintln!(
        "{} {} posts ({} drafts) into {}",
        "Rendered".green().bold(),
        summary.rendered,
        summary.drafts,
        config.output_dir
    );
    for source in &summary.failed {
        eprintln!("{}: failed to render {source}", "error".red().bold());
    }
    Ok(summary.failed.is_empty())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Set up miette for nice error formatting
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok();

    let cmd = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing();

    let result = match cmd {
        Command::Render(args) => run_render(args).await.map(|()| true),
        Command::Build(args) => run_build(args).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {e:?}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}
