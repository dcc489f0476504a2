//! `quizmark.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level quizmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizmarkConfig {
    /// Max submissions graded concurrently by `batch`.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for batch reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Keep per-question detail in batch reports.
    #[serde(default = "default_include_details")]
    pub include_details: bool,
    /// Report formats written by `batch` when `--format` is not given.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizmark-results")
}
fn default_include_details() -> bool {
    true
}
fn default_formats() -> Vec<String> {
    vec!["json".to_string()]
}

impl Default for QuizmarkConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            include_details: default_include_details(),
            formats: default_formats(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = lookup(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizmark.toml` in the current directory
/// 2. `~/.config/quizmark/config.toml`
///
/// Environment variable overrides: `QUIZMARK_PARALLELISM`, `QUIZMARK_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizmark.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => QuizmarkConfig::default(),
    };

    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Apply `QUIZMARK_*` overrides and resolve `${VAR}` references.
fn apply_env_overrides(
    mut config: QuizmarkConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<QuizmarkConfig> {
    if let Some(value) = lookup("QUIZMARK_PARALLELISM") {
        config.parallelism = value
            .trim()
            .parse()
            .with_context(|| format!("invalid QUIZMARK_PARALLELISM: '{value}'"))?;
    }
    if let Some(value) = lookup("QUIZMARK_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(value);
    }

    let output_dir = config.output_dir.to_string_lossy().into_owned();
    config.output_dir = PathBuf::from(resolve_env_vars(&output_dir, &lookup));

    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmark"))
}
