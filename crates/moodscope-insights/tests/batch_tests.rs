//! Batch refresh over every known scope

mod common;

use common::{MockClassifier, MockRepository};
use moodscope_core::Scope;
use moodscope_insights::{BatchRunner, BatchSummary, GeoDataset, InsightsEngine};
use std::io::Write;
use std::sync::Arc;

fn runner(repository: Arc<MockRepository>, geo: GeoDataset) -> BatchRunner {
    let engine = InsightsEngine::new(repository, Arc::new(MockClassifier::new()));
    BatchRunner::new(Arc::new(engine), Arc::new(geo))
}

#[tokio::test]
async fn test_failing_scope_is_isolated() {
    let repository = Arc::new(
        MockRepository::new()
            .with_known(&["US", "BR", "FR"])
            .with_texts(Some("BR"), &["good game"])
            .with_texts(Some("US"), &["bad storm"])
            .with_texts(None, &["good game", "bad storm"])
            .failing_for(Some("FR")),
    );
    let runner = runner(repository.clone(), GeoDataset::empty());

    let summary = runner.run_all().await;

    assert_eq!(
        summary,
        BatchSummary {
            processed: 2,
            failed: 1
        }
    );
    // Three countries plus global
    assert_eq!(repository.fetch_count(), 4);
}

#[tokio::test]
async fn test_global_failure_only_counts_as_failed() {
    let repository = Arc::new(
        MockRepository::new()
            .with_known(&["FR"])
            .failing_for(None),
    );
    let runner = runner(repository, GeoDataset::empty());

    assert_eq!(
        runner.run_all().await,
        BatchSummary {
            processed: 1,
            failed: 1
        }
    );
}

#[tokio::test]
async fn test_scopes_merge_sources_and_drop_invalid_codes() {
    let mut geo_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        geo_file,
        r#"{{"type": "FeatureCollection", "features": [
            {{"properties": {{"ISO_A2": "FR"}}}},
            {{"properties": {{"ISO_A2": "-99"}}}},
            {{"properties": {{"ISO_A2": "jp"}}}}
        ]}}"#
    )
    .unwrap();

    let repository = Arc::new(MockRepository::new().with_known(&["fr", "DE", "usa", "Z1"]));
    let runner = runner(repository, GeoDataset::new(geo_file.path()));

    let scopes = runner.known_scopes().await;

    let codes: Vec<_> = scopes.iter().map(|s| s.to_string()).collect();
    assert_eq!(codes, vec!["DE", "FR", "JP"]);
    assert!(scopes.iter().all(|s| !s.is_global()));
}

#[tokio::test]
async fn test_listing_failure_still_uses_geo_codes() {
    let mut geo_file = tempfile::NamedTempFile::new().unwrap();
    write!(geo_file, r#"[{{"cca2": "NZ"}}, {{"iso2": "AU"}}]"#).unwrap();

    let repository = Arc::new(MockRepository::new().with_failing_list());
    let runner = runner(repository, GeoDataset::new(geo_file.path()));

    assert_eq!(
        runner.known_scopes().await,
        vec![Scope::country("AU").unwrap(), Scope::country("NZ").unwrap()]
    );
    let summary = runner.run_all().await;
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_no_sources_still_refreshes_global() {
    let repository = Arc::new(MockRepository::new().with_texts(None, &["good"]));
    let engine = Arc::new(InsightsEngine::new(
        repository.clone(),
        Arc::new(MockClassifier::new()),
    ));
    let runner = BatchRunner::new(engine.clone(), Arc::new(GeoDataset::empty()));

    assert_eq!(runner.run_all().await, BatchSummary::default());
    assert_eq!(repository.fetch_count(), 1);

    let snapshot = engine.metrics().snapshot();
    assert_eq!(snapshot.computations, 1);
    assert_eq!(snapshot.scopes_processed, 0);
}
