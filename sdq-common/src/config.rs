//! Configuration loading and config file resolution
//!
//! All settings live in one TOML file. Every field has a built-in default,
//! so a missing file (or a file with only a few keys) is valid.

use crate::{Error, Result, SeasonKey};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SDQ_CONFIG";

/// Lowest plausible number of recorded plays in a completed event
pub const DEFAULT_MIN_PLAYS: u32 = 300;

/// Highest plausible number of recorded plays in a completed event
pub const DEFAULT_MAX_PLAYS: u32 = 800;

/// Top-level configuration file contents
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to the SQLite store holding the season tables
    pub database_path: PathBuf,

    /// Seasons known to the pipeline
    pub valid_seasons: Vec<String>,

    /// Reject seasons missing from `valid_seasons` instead of warning
    pub strict_season_check: bool,

    /// Predictors every finalized event should have a prediction from
    pub expected_predictors: Vec<String>,

    pub quality: QualityConfig,
    pub models: ModelsConfig,
    pub update: UpdateConfig,
    pub retrain: RetrainConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/events.sqlite"),
            valid_seasons: ["2021-2022", "2022-2023", "2023-2024", "2024-2025"]
                .into_iter()
                .map(String::from)
                .collect(),
            strict_season_check: false,
            expected_predictors: default_predictors(),
            quality: QualityConfig::default(),
            models: ModelsConfig::default(),
            update: UpdateConfig::default(),
            retrain: RetrainConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_predictors() -> Vec<String> {
    ["Baseline", "Linear", "Tree", "MLP"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Thresholds used by the consistency checks
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_plays: u32,
    pub max_plays: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_plays: DEFAULT_MIN_PLAYS,
            max_plays: DEFAULT_MAX_PLAYS,
        }
    }
}

/// Where trained model artifacts are written
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub artifacts_dir: PathBuf,
    pub artifacts: Vec<ArtifactPattern>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("models"),
            artifacts: vec![
                ArtifactPattern::new("Linear", "Ridge_Regression_", "joblib"),
                ArtifactPattern::new("Tree", "XGBoost_Regression_", "joblib"),
                ArtifactPattern::new("MLP", "MLP_Regression_", "pth"),
            ],
        }
    }
}

/// File naming convention of one model's artifacts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactPattern {
    /// Model identifier (matches a predictor name)
    pub model: String,
    /// File name prefix, e.g. `Ridge_Regression_`
    pub prefix: String,
    /// File extension without the dot
    pub extension: String,
}

impl ArtifactPattern {
    pub fn new(model: &str, prefix: &str, extension: &str) -> Self {
        Self {
            model: model.to_string(),
            prefix: prefix.to_string(),
            extension: extension.to_string(),
        }
    }

    /// Whether `file_name` follows this pattern
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.prefix)
            && Path::new(file_name)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.extension)
    }
}

/// External database updater invocation
///
/// `args` may contain `{season}` and `{predictor}` placeholders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub program: Option<String>,
    pub args: Vec<String>,
}

/// Seasons used when retraining models
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrainConfig {
    pub training_seasons: Vec<String>,
    pub test_season: String,
    /// Models to retrain, in order
    pub models: Vec<String>,
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self {
            training_seasons: ["2021-2022", "2022-2023", "2023-2024", "2024-2025"]
                .into_iter()
                .map(String::from)
                .collect(),
            test_season: "2024-2025".to_string(),
            models: ["Linear", "Tree", "MLP"].into_iter().map(String::from).collect(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the resolved file, or defaults when none exists
    ///
    /// A file that was requested or discovered but cannot be read or parsed
    /// is an error. Runs before logging is set up, so the caller reports the
    /// returned source.
    pub fn load_resolved(cli_arg: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let source = resolve_config_path(cli_arg);
        let config = match &source {
            ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => Self::load(path)?,
            ConfigSource::Defaults => Self::default(),
        };
        Ok((config, source))
    }

    fn validate(&self) -> Result<()> {
        if self.quality.min_plays > self.quality.max_plays {
            return Err(Error::Config(format!(
                "quality.min_plays ({}) exceeds quality.max_plays ({})",
                self.quality.min_plays, self.quality.max_plays
            )));
        }

        for season in self.valid_seasons.iter().chain(&self.retrain.training_seasons) {
            SeasonKey::parse(season)
                .map_err(|e| Error::Config(format!("season list entry rejected: {}", e)))?;
        }
        SeasonKey::parse(&self.retrain.test_season)
            .map_err(|e| Error::Config(format!("retrain.test_season rejected: {}", e)))?;

        Ok(())
    }

    /// Check a season against `valid_seasons`
    ///
    /// Unlisted seasons are only reported with a warning unless
    /// `strict_season_check` is set.
    pub fn check_season_listed(&self, season: &SeasonKey) -> Result<()> {
        let label = season.as_label();
        if self.valid_seasons.iter().any(|s| *s == label) {
            return Ok(());
        }

        if self.strict_season_check {
            return Err(Error::InvalidSeason(format!(
                "{} is not listed in valid_seasons",
                label
            )));
        }

        warn!(
            "{} is not listed in valid_seasons; add it to the configuration file",
            label
        );
        Ok(())
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` argument or `SDQ_CONFIG`
    Explicit(PathBuf),
    /// Per-user or system-wide default location
    Discovered(PathBuf),
    /// No file, built-in defaults
    Defaults,
}

/// Config file resolution, highest priority first:
/// 1. Command-line argument
/// 2. `SDQ_CONFIG` environment variable
/// 3. `~/.config/sdq/config.toml`, then `/etc/sdq/config.toml`
/// 4. Built-in defaults
pub fn resolve_config_path(cli_arg: Option<&Path>) -> ConfigSource {
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("sdq").join("config.toml"));
    let system_config = PathBuf::from("/etc/sdq/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|path| path.exists())
        .map(ConfigSource::Discovered)
        .unwrap_or(ConfigSource::Defaults)
}
