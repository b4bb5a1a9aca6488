//! Classifier traits and common types

use async_trait::async_trait;
use moodscope_core::{LabelScore, Result, SentimentLabel};
use std::sync::Arc;

/// Trait for anything that labels a batch of texts.
///
/// Implementations must return exactly one label per input, in input order.
#[async_trait]
pub trait BatchClassifier: Send + Sync {
    /// Classify every text in the batch
    async fn classify(&self, texts: &[String]) -> Result<Vec<SentimentLabel>>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// An in-process inference pipeline (the primary tier)
#[async_trait]
pub trait LocalPipeline: Send + Sync {
    /// Return the top candidate for each text, in input order
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<LabelScore>>;

    /// Get the pipeline name
    fn name(&self) -> &str;
}

/// Builds a local pipeline on first use
#[async_trait]
pub trait PipelineFactory: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn LocalPipeline>>;

    /// Human-readable description used in logs
    fn describe(&self) -> String;
}

/// Outcome of asking the primary tier for labels
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    /// The tier labelled the whole batch
    Labels(Vec<SentimentLabel>),
    /// The tier could not serve this batch; the next tier should
    Unavailable(String),
}

/// Why a remote batch was answered with neutral labels instead of failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The request exceeded its wall-clock budget
    Timeout,
    /// The service answered 502, 503 or 504
    ServiceUnavailable,
}

impl DegradeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ServiceUnavailable => "unavailable",
        }
    }
}

/// Outcome of a remote classification request that did not fail hard
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    Classified(Vec<SentimentLabel>),
    Degraded {
        reason: DegradeReason,
        labels: Vec<SentimentLabel>,
    },
}

impl RemoteOutcome {
    /// Label every one of `len` texts neutral
    pub fn degraded(reason: DegradeReason, len: usize) -> Self {
        Self::Degraded {
            reason,
            labels: vec![SentimentLabel::Neutral; len],
        }
    }

    pub fn labels(&self) -> &[SentimentLabel] {
        match self {
            Self::Classified(labels) | Self::Degraded { labels, .. } => labels,
        }
    }

    pub fn into_labels(self) -> Vec<SentimentLabel> {
        match self {
            Self::Classified(labels) | Self::Degraded { labels, .. } => labels,
        }
    }
}
