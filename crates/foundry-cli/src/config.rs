//! Configuration management for the CLI.
//!
//! Secrets never live in this file; they come from the environment.

use crate::error::{CliError, Result};
use foundry_extractor::{ExtractorConfig, RunnerConfig};
use foundry_feeds::FeedConfig;
use foundry_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model endpoints, retry and transport
    #[serde(default)]
    pub llm: LlmConfig,

    /// Chunking, models and selection
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Article filters and pacing
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Feeds read by `run` when no article file is given
    #[serde(default)]
    pub feeds: FeedConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// SQLite archive location (defaults to `~/.foundry/foundry.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the config file and the default archive.
    pub fn dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".foundry"))
    }

    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Load configuration from `explicit`, or from the default path.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.llm
            .validate()
            .map_err(|e| CliError::Config(format!("[llm] {}", e)))?;
        self.extractor.validate()?;
        self.feeds.validate()?;
        Ok(())
    }

    /// Archive path: `--db`, then the config value, then the default.
    pub fn db_path(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        match flag.or_else(|| self.settings.db_path.clone()) {
            Some(path) => Ok(path),
            None => Ok(Self::dir()?.join("foundry.db")),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            db_path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_extractor::ChunkPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [extractor]
            max_chunk_chars = 3000

            [extractor.chunk_policy]
            kind = "overlapping"
            overlap_chars = 300

            [runner]
            article_delay_ms = 0

            [feeds]
            urls = ["https://news.example.com/rss"]

            [settings]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.extractor.max_chunk_chars, 3000);
        assert_eq!(
            config.extractor.chunk_policy,
            ChunkPolicy::Overlapping { overlap_chars: 300 }
        );
        assert_eq!(config.runner.article_delay_ms, 0);
        assert_eq!(config.runner.min_text_chars, 200);
        assert_eq!(config.feeds.urls, vec!["https://news.example.com/rss"]);
        assert_eq!(config.feeds.per_feed_limit, 5);
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert_eq!(config.llm, LlmConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.settings.color = false;
        config.settings.db_path = Some(PathBuf::from("/tmp/uc.db"));
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn test_invalid_section_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[llm]\nendpoints = []\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }

    #[test]
    fn test_empty_feed_list_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feeds]\nurls = []\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(CliError::Feed(_))));
    }

    #[test]
    fn test_db_path_precedence() {
        let mut config = Config::default();
        config.settings.db_path = Some(PathBuf::from("from-config.db"));
        assert_eq!(
            config.db_path(Some(PathBuf::from("flag.db"))).unwrap(),
            PathBuf::from("flag.db")
        );
        assert_eq!(config.db_path(None).unwrap(), PathBuf::from("from-config.db"));
    }
}
