//! MoodScope Insights
//!
//! Turns recent user text into a per-scope mood: sentiment tally, trending
//! topics and a one-sentence insight.
//!
//! ## Pipeline
//!
//! 1. Look up the scope in the TTL cache
//! 2. Sample recent posts and comments from a [`TextRepository`]
//! 3. Classify the samples with a [`BatchClassifier`](moodscope_classifiers::BatchClassifier)
//! 4. Tally labels, rank topics and render the insight
//! 5. Store the result
//!
//! [`BatchRunner`] repeats this for every known country and then the global
//! scope. [`MoodService`] is the surface the API layer calls.

pub mod aggregate;
pub mod batch;
pub mod cache;
pub mod config;
pub mod engine;
pub mod geo;
pub mod normalize;
pub mod repository;
pub mod service;
pub mod topics;

pub use aggregate::{aggregate, synthesize, Mood, EMPTY_INSIGHT};
pub use batch::{BatchRunner, BatchSummary};
pub use cache::{CacheEntry, Clock, ManualClock, MoodCache, MoodStore, SystemClock};
pub use config::InsightsConfig;
pub use engine::{EngineSettings, InsightsEngine};
pub use geo::GeoDataset;
pub use normalize::TextNormalizer;
pub use repository::{FileTextRepository, SampleBudget, TextRepository};
pub use service::MoodService;
pub use topics::TopicExtractor;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::BatchSummary;
    pub use crate::config::InsightsConfig;
    pub use crate::engine::InsightsEngine;
    pub use crate::repository::{SampleBudget, TextRepository};
    pub use crate::service::MoodService;
}
