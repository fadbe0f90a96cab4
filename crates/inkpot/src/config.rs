//! Configuration file discovery and parsing
//!
//! Searches for `.config/inkpot.yaml` walking up from the current directory.
//! The project root is the parent of `.config/`.

use std::env;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, eyre};
use inkmark::{FetchErrorPolicy, PipelineConfig};
use inkpot_config::{InkpotConfig, PipelineSettings};

const CONFIG_DIR: &str = ".config";
const CONFIG_FILE_YAML: &str = "inkpot.yaml";

/// Used when no configuration file is found
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_OUTPUT_DIR: &str = "public";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Discovered configuration with resolved paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Project root (parent of .config/)
    pub root: Utf8PathBuf,
    /// Absolute path to content directory
    pub content_dir: Utf8PathBuf,
    /// Absolute path to output directory
    pub output_dir: Utf8PathBuf,
    pub pipeline: PipelineConfig,
    /// Per-request timeout for code embed fetches
    pub fetch_timeout: Duration,
}

impl ResolvedConfig {
    /// Discover and load configuration from the current directory, falling
    /// back to defaults rooted there.
    pub fn discover() -> Result<Self> {
        let cwd = env::current_dir()?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
            eyre!(
                "Current directory is not valid UTF-8: {}",
                e.as_path().display()
            )
        })?;
        Self::discover_from(&cwd)
    }

    /// Discover configuration walking up from `start`.
    pub fn discover_from(start: &Utf8Path) -> Result<Self> {
        match find_config_file(start) {
            Some(path) => {
                tracing::debug!(path = %path, "using configuration file");
                load_config(&path)
            }
            None => {
                tracing::debug!(root = %start, "no configuration file, using defaults");
                Ok(Self::defaults(start))
            }
        }
    }

    pub fn defaults(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            content_dir: root.join(DEFAULT_CONTENT_DIR),
            output_dir: root.join(DEFAULT_OUTPUT_DIR),
            pipeline: PipelineConfig::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

/// Search for `.config/inkpot.yaml` walking up from `start`
fn find_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE_YAML))
        .find(|path| path.is_file())
}

/// Load and resolve configuration from a config file path
fn load_config(config_path: &Utf8Path) -> Result<ResolvedConfig> {
    let content = fs_err::read_to_string(config_path)?;

    let config: InkpotConfig = facet_yaml::from_str(&content)
        .map_err(|e| eyre!("Failed to parse {}: {}", config_path, e))?;

    // Project root is the parent of .config/
    let config_dir = config_path
        .parent()
        .ok_or_else(|| eyre!("Config file has no parent directory"))?;
    let root = config_dir
        .parent()
        .ok_or_else(|| eyre!(".config directory has no parent"))?
        .to_owned();

    let settings = config.pipeline.unwrap_or_default();
    let pipeline = pipeline_config(&settings)
        .map_err(|e| eyre!("Invalid pipeline in {}: {}", config_path, e))?;
    let fetch_timeout =
        Duration::from_secs(settings.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS));

    Ok(ResolvedConfig {
        content_dir: root.join(&config.content),
        output_dir: root.join(&config.output),
        root,
        pipeline,
        fetch_timeout,
    })
}

/// Turn file settings into a pipeline config, validating pass names and the
/// fetch error policy.
fn pipeline_config(settings: &PipelineSettings) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();

    if let Some(height) = &settings.default_code_height {
        config.default_code_height = height.clone();
    }
    if let Some(max) = settings.max_concurrent_fetches {
        if max == 0 {
            return Err(eyre!("max_concurrent_fetches must be at least 1"));
        }
        config.max_concurrent_fetches = max;
    }
    if let Some(policy) = &settings.on_fetch_error {
        config.on_fetch_error = policy.parse::<FetchErrorPolicy>().map_err(|e| eyre!(e))?;
    }
    if let Some(passes) = &settings.passes {
        config = config.with_pass_names(passes)?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkmark::PassKind;

    fn write_config(root: &Utf8Path, yaml: &str) {
        fs_err::create_dir_all(root.join(CONFIG_DIR)).unwrap();
        fs_err::write(root.join(CONFIG_DIR).join(CONFIG_FILE_YAML), yaml).unwrap();
    }

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_discovers_config_in_ancestor() {
        let (_dir, root) = temp_root();
        write_config(
            &root,
            "content: posts/\noutput: dist/\npipeline:\n  default_code_height: 400px\n  fetch_timeout_secs: 5\n  on_fetch_error: fail\n",
        );
        let nested = root.join("posts/2024");
        fs_err::create_dir_all(&nested).unwrap();

        let config = ResolvedConfig::discover_from(&nested).unwrap();
        assert_eq!(config.root, root);
        assert_eq!(config.content_dir, root.join("posts/"));
        assert_eq!(config.output_dir, root.join("dist/"));
        assert_eq!(config.pipeline.default_code_height, "400px");
        assert_eq!(config.pipeline.on_fetch_error, FetchErrorPolicy::Fail);
        assert_eq!(config.pipeline.passes, PassKind::ALL.to_vec());
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_without_config() {
        let (_dir, root) = temp_root();
        let config = ResolvedConfig::discover_from(&root).unwrap();
        assert_eq!(config.content_dir, root.join("content"));
        assert_eq!(config.output_dir, root.join("public"));
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn test_unknown_pass_fails_fast() {
        let (_dir, root) = temp_root();
        write_config(
            &root,
            "content: posts\noutput: public\npipeline:\n  passes: [frontmatter, katex]\n",
        );
        let err = ResolvedConfig::discover_from(&root).unwrap_err();
        assert!(err.to_string().contains("katex"), "{err}");
    }

    #[test]
    fn test_bad_fetch_policy() {
        let settings = PipelineSettings {
            on_fetch_error: Some("retry".into()),
            ..PipelineSettings::default()
        };
        assert!(pipeline_config(&settings).is_err());
    }
}
