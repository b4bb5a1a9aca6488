//! Lazily-initialized primary tier
//!
//! The pipeline is built on the first non-empty batch and reused after that.
//! A failed build leaves the handle empty so the next batch tries again.

use crate::classifier::{LocalPipeline, PipelineFactory, TierOutcome};
use moodscope_core::LabelScore;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub struct LocalTier {
    factory: Option<Arc<dyn PipelineFactory>>,
    pipeline: OnceCell<Arc<dyn LocalPipeline>>,
}

impl LocalTier {
    /// A tier backed by `factory`
    pub fn new(factory: Arc<dyn PipelineFactory>) -> Self {
        Self {
            factory: Some(factory),
            pipeline: OnceCell::new(),
        }
    }

    /// A tier with no on-box pipeline; every batch goes to the next tier
    pub fn disabled() -> Self {
        Self {
            factory: None,
            pipeline: OnceCell::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.factory.is_some()
    }

    /// Whether the pipeline has been built successfully
    pub fn is_initialized(&self) -> bool {
        self.pipeline.initialized()
    }

    /// Label a batch, or explain why this tier cannot
    pub async fn classify(&self, texts: &[String]) -> TierOutcome {
        let Some(factory) = &self.factory else {
            return TierOutcome::Unavailable("no local pipeline configured".to_string());
        };

        let pipeline = match self
            .pipeline
            .get_or_try_init(|| async {
                info!("Initializing local sentiment pipeline ({})", factory.describe());
                factory.build().await
            })
            .await
        {
            Ok(pipeline) => Arc::clone(pipeline),
            Err(e) => {
                warn!("Local pipeline initialization failed: {}", e);
                return TierOutcome::Unavailable(format!("initialization failed: {e}"));
            }
        };

        match pipeline.classify_batch(texts).await {
            Ok(scores) if scores.len() == texts.len() => {
                debug!(
                    pipeline = pipeline.name(),
                    count = scores.len(),
                    "Local pipeline labelled batch"
                );
                TierOutcome::Labels(scores.iter().map(LabelScore::sentiment).collect())
            }
            Ok(scores) => TierOutcome::Unavailable(format!(
                "pipeline returned {} results for {} texts",
                scores.len(),
                texts.len()
            )),
            Err(e) => {
                warn!("Local pipeline inference failed: {}", e);
                TierOutcome::Unavailable(format!("inference failed: {e}"))
            }
        }
    }
}
