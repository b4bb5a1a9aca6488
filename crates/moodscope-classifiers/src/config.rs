//! Configuration for the sentiment classifier tiers

use crate::bert::{BertFactory, BertSource};
use crate::lexicon::LexiconFactory;
use crate::local::LocalTier;
use crate::remote::RemoteClassifier;
use crate::sentiment::{SentimentClassifier, DEFAULT_MAX_TEXT_CHARS};
use moodscope_core::{Error, Result};
use moodscope_telemetry::MetricsCollector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for both classification tiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// On-box pipeline
    #[serde(default)]
    pub local: LocalPipelineSpec,

    /// Remote inference service
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Characters kept per text before classification
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

/// Which on-box pipeline to build
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LocalPipelineSpec {
    /// No on-box tier; every batch goes remote
    #[default]
    None,

    /// Word-list pipeline
    Lexicon,

    /// Candle BERT sequence classifier (`ml-models` feature)
    Bert {
        source: BertSource,
        #[serde(default)]
        labels: Option<Vec<String>>,
        #[serde(default = "default_max_length")]
        max_length: usize,
        #[serde(default = "default_device")]
        device: String,
    },
}

/// Remote inference service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token; usually supplied through the environment
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            local: LocalPipelineSpec::default(),
            remote: RemoteConfig::default(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse classifier config: {e}")))
    }

    /// Reject settings no classifier could run with
    pub fn validate(&self) -> Result<()> {
        if self.max_text_chars == 0 {
            return Err(Error::config("max_text_chars must be greater than zero"));
        }
        if self.remote.timeout_secs == 0 {
            return Err(Error::config("remote.timeout_secs must be greater than zero"));
        }
        if self.remote.endpoint.trim().is_empty() {
            return Err(Error::config("remote.endpoint must not be empty"));
        }
        Ok(())
    }

    /// Build the local tier described by `local`
    pub fn local_tier(&self) -> LocalTier {
        match &self.local {
            LocalPipelineSpec::None => LocalTier::disabled(),
            LocalPipelineSpec::Lexicon => LocalTier::new(Arc::new(LexiconFactory)),
            LocalPipelineSpec::Bert {
                source,
                labels,
                max_length,
                device,
            } => LocalTier::new(Arc::new(BertFactory {
                source: source.clone(),
                labels: labels.clone(),
                max_length: *max_length,
                device: device.clone(),
            })),
        }
    }

    /// Build the remote tier
    pub fn remote_classifier(&self) -> RemoteClassifier {
        RemoteClassifier::new(
            self.remote.endpoint.clone(),
            self.remote.token.clone(),
            Duration::from_secs(self.remote.timeout_secs),
        )
    }

    /// Build the two-tier classifier
    pub fn build(&self, metrics: MetricsCollector) -> Result<SentimentClassifier> {
        self.validate()?;
        Ok(
            SentimentClassifier::new(self.local_tier(), self.remote_classifier())
                .with_max_text_chars(self.max_text_chars)
                .with_metrics(metrics),
        )
    }
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment-latest"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_text_chars() -> usize {
    DEFAULT_MAX_TEXT_CHARS
}

fn default_max_length() -> usize {
    512
}

fn default_device() -> String {
    "cpu".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ClassifierConfig::default());
        assert_eq!(config.local, LocalPipelineSpec::None);
        assert_eq!(config.remote.timeout_secs, 20);
        assert_eq!(config.max_text_chars, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
local:
  kind: bert
  source:
    type: local
    path: ./models/sentiment
  labels: [negative, neutral, positive]
remote:
  endpoint: http://localhost:8000/classify
  token: secret
  timeout_secs: 5
max_text_chars: 256
"#;
        let config = ClassifierConfig::from_yaml(yaml).unwrap();
        assert!(matches!(
            config.local,
            LocalPipelineSpec::Bert { ref labels, max_length: 512, .. }
                if labels.as_ref().map(Vec::len) == Some(3)
        ));
        assert_eq!(config.remote.token.as_deref(), Some("secret"));
        assert_eq!(config.max_text_chars, 256);
        assert!(config.local_tier().is_enabled());
    }

    #[test]
    fn test_lexicon_and_none_tiers() {
        let lexicon = ClassifierConfig::from_yaml("local:\n  kind: lexicon\n").unwrap();
        assert!(lexicon.local_tier().is_enabled());
        assert!(!ClassifierConfig::default().local_tier().is_enabled());
    }

    #[test]
    fn test_token_is_not_serialized() {
        let mut config = ClassifierConfig::default();
        config.remote.token = Some("secret".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = ClassifierConfig::default();
        config.remote.timeout_secs = 0;
        assert!(config.validate().is_err());
        assert!(config.build(MetricsCollector::new()).is_err());
    }
}
