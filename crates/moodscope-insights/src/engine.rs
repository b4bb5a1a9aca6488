//! Single-scope mood computation
//!
//! `compute_mood` serves a fresh cached result when there is one. Otherwise
//! it samples recent text, classifies it, tallies the labels, extracts
//! topics and writes the new result back to the cache.

use crate::aggregate::{aggregate, synthesize, EMPTY_INSIGHT};
use crate::cache::{MoodCache, MoodStore};
use crate::config::InsightsConfig;
use crate::repository::{SampleBudget, TextRepository};
use crate::topics::TopicExtractor;
use moodscope_classifiers::BatchClassifier;
use moodscope_core::{truncate_chars, CountryMood, Error, MoodCounts, Result, Scope};
use moodscope_telemetry::MetricsCollector;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Per-computation knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub budget: SampleBudget,
    pub topic_limit: usize,
    pub max_text_chars: usize,
    pub single_flight: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&InsightsConfig::default())
    }
}

impl From<&InsightsConfig> for EngineSettings {
    fn from(config: &InsightsConfig) -> Self {
        Self {
            budget: config.budget(),
            topic_limit: config.topic_limit,
            max_text_chars: config.max_text_chars,
            single_flight: config.single_flight,
        }
    }
}

/// Computes and caches the mood of one scope at a time
pub struct InsightsEngine {
    repository: Arc<dyn TextRepository>,
    classifier: Arc<dyn BatchClassifier>,
    cache: Arc<dyn MoodStore>,
    topics: TopicExtractor,
    settings: EngineSettings,
    metrics: MetricsCollector,
    // One gate per cache key, only used with single-flight on
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl InsightsEngine {
    pub fn new(
        repository: Arc<dyn TextRepository>,
        classifier: Arc<dyn BatchClassifier>,
    ) -> Self {
        Self {
            repository,
            classifier,
            cache: Arc::new(MoodCache::default()),
            topics: TopicExtractor::default(),
            settings: EngineSettings::default(),
            metrics: MetricsCollector::new(),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn MoodStore>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_topic_extractor(mut self, topics: TopicExtractor) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn repository(&self) -> &Arc<dyn TextRepository> {
        &self.repository
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Mood for `scope`, from cache when fresh
    pub async fn compute_mood(&self, scope: &Scope) -> Result<Arc<CountryMood>> {
        let key = scope.cache_key();

        if let Some(hit) = self.cache.get(&key) {
            self.metrics.record_cache_hit();
            debug!(scope = %scope, computed_at = %hit.computed_at, "Serving cached mood");
            return Ok(hit);
        }
        self.metrics.record_cache_miss();

        if !self.settings.single_flight {
            return self.refresh(scope, key).await;
        }

        let gate = self.gate(&key);
        let _guard = gate.lock().await;

        // Another caller may have finished while we waited
        if let Some(hit) = self.cache.get(&key) {
            debug!(scope = %scope, "Mood computed by a concurrent caller");
            return Ok(hit);
        }
        self.refresh(scope, key).await
    }

    fn gate(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock();
        Arc::clone(inflight.entry(key.to_string()).or_default())
    }

    async fn refresh(&self, scope: &Scope, key: String) -> Result<Arc<CountryMood>> {
        let texts = self
            .repository
            .fetch_texts(scope, self.settings.budget)
            .await
            .map_err(|e| match e {
                Error::Repository(_) => e,
                other => Error::repository(other.to_string()),
            })?;

        let texts: Vec<String> = texts
            .iter()
            .take(self.settings.budget.total())
            .map(|text| truncate_chars(text, self.settings.max_text_chars).to_string())
            .collect();

        if texts.is_empty() {
            info!(scope = %scope, "No recent samples, caching empty mood");
            let mood = CountryMood::new(
                scope,
                MoodCounts::default(),
                Vec::new(),
                EMPTY_INSIGHT,
                self.cache.now(),
            );
            self.metrics.record_computation();
            return Ok(self.cache.put(key, mood));
        }

        let labels = self
            .classifier
            .classify(&texts)
            .await
            .map_err(Error::classification)?;
        if labels.len() != texts.len() {
            return Err(Error::classification(Error::classifier(format!(
                "{} returned {} labels for {} texts",
                self.classifier.name(),
                labels.len(),
                texts.len()
            ))));
        }

        let counts = aggregate(&labels);
        let topics = self.topics.extract(texts.as_slice(), self.settings.topic_limit);
        let insight = synthesize(&counts, topics.as_slice());
        let mood = CountryMood::new(scope, counts, topics, insight, self.cache.now());

        self.metrics.record_computation();
        info!(
            scope = %scope,
            total = counts.total,
            positive = counts.positive,
            negative = counts.negative,
            "Mood refreshed"
        );
        Ok(self.cache.put(key, mood))
    }
}
