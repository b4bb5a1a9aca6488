//! Lightweight lexicon pipeline for the on-box tier
//!
//! Counts whole-word hits against positive and negative word lists. Useful
//! when no model weights are deployed but remote calls should be avoided.

use crate::classifier::{LocalPipeline, PipelineFactory};
use aho_corasick::{AhoCorasick, MatchKind};
use async_trait::async_trait;
use moodscope_core::{Error, LabelScore, Result};
use std::sync::Arc;

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "love",
    "loved",
    "amazing",
    "wonderful",
    "happy",
    "fantastic",
    "awesome",
    "best",
    "beautiful",
    "glad",
    "hope",
    "proud",
    "thanks",
    "win",
    "enjoy",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "hate",
    "horrible",
    "worst",
    "sad",
    "angry",
    "disappointed",
    "poor",
    "afraid",
    "scared",
    "crisis",
    "broken",
    "tired",
    "fail",
    "worried",
    "unfair",
];

/// Share of positive hits above which a text is positive (and below
/// `1 - POLARITY_MARGIN` negative).
const POLARITY_MARGIN: f32 = 0.6;

pub struct LexiconPipeline {
    name: String,
    positive: AhoCorasick,
    negative: AhoCorasick,
}

impl LexiconPipeline {
    pub fn new() -> Result<Self> {
        Self::with_name("sentiment-lexicon")
    }

    pub fn with_name(name: impl Into<String>) -> Result<Self> {
        let positive = build_matcher(POSITIVE_WORDS)
            .map_err(|e| Error::classifier(format!("Failed to build positive matcher: {e}")))?;
        let negative = build_matcher(NEGATIVE_WORDS)
            .map_err(|e| Error::classifier(format!("Failed to build negative matcher: {e}")))?;

        Ok(Self {
            name: name.into(),
            positive,
            negative,
        })
    }

    /// Score one text
    pub fn score(&self, text: &str) -> LabelScore {
        let positive_hits = count_words(&self.positive, text) as f32;
        let negative_hits = count_words(&self.negative, text) as f32;
        let total = positive_hits + negative_hits;

        if total == 0.0 {
            return LabelScore::new("neutral", 1.0);
        }

        let share = positive_hits / total;
        if share >= POLARITY_MARGIN {
            LabelScore::new("positive", share)
        } else if share <= 1.0 - POLARITY_MARGIN {
            LabelScore::new("negative", 1.0 - share)
        } else {
            LabelScore::new("neutral", 1.0 - (share - 0.5).abs())
        }
    }
}

fn build_matcher(words: &[&str]) -> std::result::Result<AhoCorasick, aho_corasick::BuildError> {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(words)
}

/// Count matches that sit on word boundaries ("good" but not "goodbye")
fn count_words(matcher: &AhoCorasick, text: &str) -> usize {
    matcher
        .find_iter(text)
        .filter(|m| {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .count()
}

#[async_trait]
impl LocalPipeline for LexiconPipeline {
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<LabelScore>> {
        Ok(texts.iter().map(|text| self.score(text)).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Factory for the lexicon pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconFactory;

#[async_trait]
impl PipelineFactory for LexiconFactory {
    async fn build(&self) -> Result<Arc<dyn LocalPipeline>> {
        Ok(Arc::new(LexiconPipeline::new()?))
    }

    fn describe(&self) -> String {
        "lexicon".to_string()
    }
}
