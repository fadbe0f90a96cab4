//! Configuration types for the inkpot blog generator.
//!
//! This crate contains the configuration structs that are parsed from
//! `.config/inkpot.yaml`.

use facet::Facet;

/// Inkpot configuration from `.config/inkpot.yaml`
#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "snake_case")]
pub struct InkpotConfig {
    /// Content directory (relative to project root)
    pub content: String,

    /// Output directory (relative to project root)
    pub output: String,

    /// Transform pipeline settings
    #[facet(default)]
    pub pipeline: Option<PipelineSettings>,
}

/// Transform pipeline settings.
///
/// Every field is optional; missing ones fall back to the library defaults.
#[derive(Debug, Clone, Default, Facet)]
#[facet(rename_all = "snake_case")]
pub struct PipelineSettings {
    /// Max height of embedded code when the directive has no `height`
    /// (e.g., "400px"). Default: "300px"
    #[facet(default)]
    pub default_code_height: Option<String>,

    /// Maximum number of embeds fetched at once per document. Default: 8
    #[facet(default)]
    pub max_concurrent_fetches: Option<usize>,

    /// Per-request timeout for embed fetches, in seconds. Default: 30
    #[facet(default)]
    pub fetch_timeout_secs: Option<u64>,

    /// What to do when an embed cannot be fetched: "placeholder" or "fail".
    /// Default: "placeholder"
    #[facet(default)]
    pub on_fetch_error: Option<String>,

    /// Passes to run, in order.
    /// Default: ["frontmatter", "code_embed", "popup_notes"]
    #[facet(default)]
    pub passes: Option<Vec<String>>,
}
