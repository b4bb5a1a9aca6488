//! Runner configuration

use moodscope_classifiers::ClassifierConfig;
use moodscope_insights::InsightsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodscopeConfig {
    /// Mood computation settings
    #[serde(default)]
    pub insights: InsightsConfig,

    /// Classifier tiers
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// JSON export of posts and comments
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Country boundary dataset used to enumerate scopes
    #[serde(default)]
    pub geo_path: Option<PathBuf>,
}

impl MoodscopeConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(data) = &cli.data {
            config.data_path = data.clone();
        }

        if let Some(geo) = &cli.geo {
            config.geo_path = Some(geo.clone());
        }

        if let Some(token) = &cli.remote_token {
            config.classifier.remote.token = Some(token.clone());
        }

        config.insights.validate()?;
        config.classifier.validate()?;
        Ok(config)
    }
}

impl Default for MoodscopeConfig {
    fn default() -> Self {
        Self {
            insights: InsightsConfig::default(),
            classifier: ClassifierConfig::default(),
            data_path: default_data_path(),
            geo_path: None,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/texts.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;
    use moodscope_classifiers::LocalPipelineSpec;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let cli = Cli::try_parse_from(["moodscope", "run-all"]).unwrap();
        let config = MoodscopeConfig::load("does-not-exist.yaml", &cli).unwrap();

        assert_eq!(config.data_path, PathBuf::from("data/texts.json"));
        assert_eq!(config.insights.cache_ttl_secs, 300);
        assert_eq!(config.classifier.local, LocalPipelineSpec::None);
    }

    #[test]
    fn test_file_and_cli_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "insights:\n  cache_ttl_secs: 30\n  single_flight: true\nclassifier:\n  local:\n    kind: lexicon\n  remote:\n    timeout_secs: 5\ndata_path: /srv/texts.json\ngeo_path: /srv/countries.geojson"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from([
            "moodscope",
            "--data",
            "override.json",
            "--remote-token",
            "secret",
            "mood",
            "fr",
        ])
        .unwrap();
        let config = MoodscopeConfig::load(&path, &cli).unwrap();

        assert_eq!(config.insights.cache_ttl_secs, 30);
        assert!(config.insights.single_flight);
        assert_eq!(config.classifier.local, LocalPipelineSpec::Lexicon);
        assert_eq!(config.classifier.remote.timeout_secs, 5);
        assert_eq!(config.classifier.remote.token.as_deref(), Some("secret"));
        assert_eq!(config.data_path, PathBuf::from("override.json"));
        assert_eq!(
            config.geo_path,
            Some(PathBuf::from("/srv/countries.geojson"))
        );
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "insights:\n  primary_share: 2.0").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["moodscope", "run-all"]).unwrap();
        assert!(MoodscopeConfig::load(&path, &cli).is_err());
    }
}
