//! Insights pipeline configuration

use crate::repository::SampleBudget;
use crate::topics::DEFAULT_TOPIC_LIMIT;
use moodscope_classifiers::sentiment::DEFAULT_MAX_TEXT_CHARS;
use moodscope_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for mood computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Seconds a computed mood stays fresh
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Samples fetched per computation
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Share of samples taken from posts, the rest from comments
    #[serde(default = "default_primary_share")]
    pub primary_share: f64,

    /// Topics kept per scope
    #[serde(default = "default_topic_limit")]
    pub topic_limit: usize,

    /// Characters kept per sample
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Serialize concurrent computations of the same scope
    #[serde(default)]
    pub single_flight: bool,
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_max_samples() -> usize {
    500
}

fn default_primary_share() -> f64 {
    0.6
}

fn default_topic_limit() -> usize {
    DEFAULT_TOPIC_LIMIT
}

fn default_max_text_chars() -> usize {
    DEFAULT_MAX_TEXT_CHARS
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            max_samples: default_max_samples(),
            primary_share: default_primary_share(),
            topic_limit: default_topic_limit(),
            max_text_chars: default_max_text_chars(),
            single_flight: false,
        }
    }
}

impl InsightsConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse insights config: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.primary_share) {
            return Err(Error::config(format!(
                "primary_share must be between 0 and 1, got {}",
                self.primary_share
            )));
        }
        if self.max_text_chars == 0 {
            return Err(Error::config("max_text_chars must be greater than 0"));
        }
        if self.topic_limit > DEFAULT_TOPIC_LIMIT {
            return Err(Error::config(format!(
                "topic_limit must be at most {DEFAULT_TOPIC_LIMIT}, got {}",
                self.topic_limit
            )));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn budget(&self) -> SampleBudget {
        SampleBudget::split(self.max_samples, self.primary_share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InsightsConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(
            config.budget(),
            SampleBudget {
                posts: 300,
                comments: 200
            }
        );
        assert_eq!(config.topic_limit, 10);
        assert_eq!(config.max_text_chars, 512);
        assert!(!config.single_flight);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config =
            InsightsConfig::from_yaml("cache_ttl_secs: 60\nsingle_flight: true\n").unwrap();
        assert_eq!(config.cache_ttl_secs, 60);
        assert!(config.single_flight);
        assert_eq!(config.max_samples, 500);
    }

    #[test]
    fn test_validate_rejects_bad_share() {
        let config = InsightsConfig {
            primary_share: 1.2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(InsightsConfig::from_yaml("max_samples: many").is_err());
    }

    #[test]
    fn test_validate_caps_topic_limit() {
        let config = InsightsConfig::from_yaml("topic_limit: 25").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("topic_limit"));

        let config = InsightsConfig::from_yaml("topic_limit: 10").unwrap();
        assert!(config.validate().is_ok());
        let config = InsightsConfig::from_yaml("topic_limit: 3").unwrap();
        assert!(config.validate().is_ok());
    }
}
