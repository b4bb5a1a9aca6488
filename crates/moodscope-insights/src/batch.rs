//! Refresh every known scope

use crate::engine::InsightsEngine;
use crate::geo::GeoDataset;
use moodscope_core::Scope;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Tally of a batch run.
///
/// `processed` counts countries only; the global scope can add to `failed`
/// but never to `processed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Drives the engine over every country, then the global scope
pub struct BatchRunner {
    engine: Arc<InsightsEngine>,
    geo: Arc<GeoDataset>,
}

impl BatchRunner {
    pub fn new(engine: Arc<InsightsEngine>, geo: Arc<GeoDataset>) -> Self {
        Self { engine, geo }
    }

    /// Country scopes from the geo dataset and the repository, sorted.
    ///
    /// Either source failing contributes nothing. Codes that are not two
    /// ASCII letters are dropped.
    pub async fn known_scopes(&self) -> Vec<Scope> {
        let mut codes: BTreeSet<String> = self.geo.country_codes().await;

        match self.engine.repository().list_known_scopes().await {
            Ok(known) => codes.extend(known),
            Err(e) => warn!(error = %e, "Failed to list scopes from repository"),
        }

        codes
            .iter()
            .filter_map(|code| Scope::country(code).ok())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Compute every scope sequentially, isolating failures
    pub async fn run_all(&self) -> BatchSummary {
        let scopes = self.known_scopes().await;
        let metrics = self.engine.metrics();
        info!(scopes = scopes.len(), "Starting mood batch");

        let mut summary = BatchSummary::default();
        for scope in &scopes {
            match self.engine.compute_mood(scope).await {
                Ok(_) => {
                    summary.processed += 1;
                    metrics.record_scope_outcome(true);
                }
                Err(e) => {
                    summary.failed += 1;
                    metrics.record_scope_outcome(false);
                    warn!(scope = %scope, error = %e, "Mood computation failed");
                }
            }
        }

        if let Err(e) = self.engine.compute_mood(&Scope::Global).await {
            summary.failed += 1;
            metrics.record_scope_outcome(false);
            warn!(scope = %Scope::Global, error = %e, "Global mood computation failed");
        }

        info!(
            processed = summary.processed,
            failed = summary.failed,
            "Mood batch finished"
        );
        summary
    }
}
