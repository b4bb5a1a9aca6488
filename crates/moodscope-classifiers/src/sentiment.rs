//! Two-tier sentiment classifier
//!
//! Texts are truncated, then offered to the on-box pipeline. When that tier
//! is unavailable for any reason the batch goes to the remote inference
//! service, whose degradations (timeout, 502/503/504) yield neutral labels
//! and whose hard failures are returned to the caller.

use crate::classifier::{BatchClassifier, RemoteOutcome, TierOutcome};
use crate::local::LocalTier;
use crate::remote::RemoteClassifier;
use async_trait::async_trait;
use moodscope_core::{truncate_chars, Result, SentimentLabel};
use moodscope_telemetry::MetricsCollector;
use tracing::debug;

/// Default per-text character budget handed to either tier
pub const DEFAULT_MAX_TEXT_CHARS: usize = 512;

pub struct SentimentClassifier {
    name: String,
    local: LocalTier,
    remote: RemoteClassifier,
    max_text_chars: usize,
    metrics: MetricsCollector,
}

impl SentimentClassifier {
    pub fn new(local: LocalTier, remote: RemoteClassifier) -> Self {
        Self {
            name: "sentiment".to_string(),
            local,
            remote,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn local_tier(&self) -> &LocalTier {
        &self.local
    }
}

#[async_trait]
impl BatchClassifier for SentimentClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<SentimentLabel>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = texts
            .iter()
            .map(|text| truncate_chars(text, self.max_text_chars).to_string())
            .collect();

        match self.local.classify(&texts).await {
            TierOutcome::Labels(labels) => {
                self.metrics.record_local_batch();
                return Ok(labels);
            }
            TierOutcome::Unavailable(reason) => {
                debug!("Local tier unavailable ({}), using remote classifier", reason);
            }
        }

        let outcome = self.remote.classify(&texts).await?;
        self.metrics.record_remote_batch();
        if let RemoteOutcome::Degraded { reason, .. } = &outcome {
            self.metrics.record_degraded_batch(reason.as_str());
        }

        Ok(outcome.into_labels())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
