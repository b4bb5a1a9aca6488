//! Entry points for the API layer and the scheduler

use crate::batch::{BatchRunner, BatchSummary};
use crate::cache::{Clock, MoodCache, SystemClock};
use crate::config::InsightsConfig;
use crate::engine::{EngineSettings, InsightsEngine};
use crate::geo::GeoDataset;
use crate::repository::TextRepository;
use moodscope_classifiers::BatchClassifier;
use moodscope_core::{CountryMood, Result, Scope};
use moodscope_telemetry::MetricsCollector;
use std::sync::Arc;

pub struct MoodService {
    engine: Arc<InsightsEngine>,
    runner: BatchRunner,
}

impl MoodService {
    pub fn new(engine: Arc<InsightsEngine>, geo: Arc<GeoDataset>) -> Self {
        Self {
            runner: BatchRunner::new(Arc::clone(&engine), geo),
            engine,
        }
    }

    /// Wire an engine from configuration with the wall clock
    pub fn from_config(
        config: &InsightsConfig,
        repository: Arc<dyn TextRepository>,
        classifier: Arc<dyn BatchClassifier>,
        geo: GeoDataset,
        metrics: MetricsCollector,
    ) -> Result<Self> {
        Self::from_config_with_clock(
            config,
            repository,
            classifier,
            geo,
            metrics,
            Arc::new(SystemClock),
        )
    }

    pub fn from_config_with_clock(
        config: &InsightsConfig,
        repository: Arc<dyn TextRepository>,
        classifier: Arc<dyn BatchClassifier>,
        geo: GeoDataset,
        metrics: MetricsCollector,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let cache = MoodCache::with_clock(config.cache_ttl(), clock);
        let engine = InsightsEngine::new(repository, classifier)
            .with_cache(Arc::new(cache))
            .with_settings(EngineSettings::from(config))
            .with_metrics(metrics);

        Ok(Self::new(Arc::new(engine), Arc::new(geo)))
    }

    pub fn engine(&self) -> &Arc<InsightsEngine> {
        &self.engine
    }

    /// Mood for an optional ISO2 code; `None` or blank is global
    pub async fn get_country_mood(&self, scope: Option<&str>) -> Result<Arc<CountryMood>> {
        let scope = Scope::parse(scope)?;
        self.engine.compute_mood(&scope).await
    }

    /// Refresh every known scope; per-scope failures only show in the tally
    pub async fn run_all_country_moods(&self) -> BatchSummary {
        self.runner.run_all().await
    }
}
