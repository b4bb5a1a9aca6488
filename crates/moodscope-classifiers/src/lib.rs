//! MoodScope Classifiers
//!
//! Sentiment classification for batches of user text, in two tiers:
//! - Local: an in-process pipeline (word lists, or a Candle BERT model with
//!   the `ml-models` feature), built lazily on first use
//! - Remote: a hosted inference endpoint, called once per batch with a hard
//!   timeout
//!
//! The local tier never fails a batch; it reports itself unavailable and the
//! remote tier takes over. The remote tier degrades to neutral labels on
//! timeouts and temporary unavailability, and fails hard otherwise.

pub mod bert;
pub mod classifier;
pub mod config;
pub mod lexicon;
pub mod local;
pub mod remote;
pub mod sentiment;

pub use bert::{BertFactory, BertSource};
pub use classifier::{
    BatchClassifier, DegradeReason, LocalPipeline, PipelineFactory, RemoteOutcome, TierOutcome,
};
pub use config::{ClassifierConfig, LocalPipelineSpec, RemoteConfig};
pub use lexicon::{LexiconFactory, LexiconPipeline};
pub use local::LocalTier;
pub use remote::{RemoteClassifier, REMOTE_TOKEN_ENV};
pub use sentiment::SentimentClassifier;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{BatchClassifier, LocalPipeline, PipelineFactory};
    pub use crate::config::ClassifierConfig;
    pub use crate::local::LocalTier;
    pub use crate::remote::RemoteClassifier;
    pub use crate::sentiment::SentimentClassifier;
}
