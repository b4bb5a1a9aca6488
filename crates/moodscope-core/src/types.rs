//! Core types for MoodScope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Cache key used for the global scope
pub const GLOBAL_SCOPE_KEY: &str = "global";

/// Geographic unit a mood computation applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Aggregate over every country
    Global,
    /// Upper-cased ISO 3166-1 alpha-2 code
    Country(String),
}

impl Scope {
    /// Parse an optional scope identifier.
    ///
    /// `None` and blank strings mean the global scope. Anything else is
    /// trimmed, upper-cased and must be exactly two ASCII letters.
    pub fn parse(scope: Option<&str>) -> Result<Self> {
        match scope.map(str::trim) {
            None | Some("") => Ok(Self::Global),
            Some(code) => Self::country(code),
        }
    }

    /// Build a country scope from an ISO2 code
    pub fn country(code: &str) -> Result<Self> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self::Country(code))
        } else {
            Err(Error::invalid_scope(format!(
                "'{code}' is not an ISO 3166-1 alpha-2 code"
            )))
        }
    }

    /// Key under which results for this scope are cached
    pub fn cache_key(&self) -> String {
        match self {
            Self::Global => GLOBAL_SCOPE_KEY.to_string(),
            Self::Country(code) => format!("cc:{code}"),
        }
    }

    /// Country code, or `None` for the global scope
    pub fn country_code(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Country(code) => Some(code),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str(GLOBAL_SCOPE_KEY),
            Self::Country(code) => f.write_str(code),
        }
    }
}

/// Canonical sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Map a provider-specific label onto the canonical vocabulary.
    ///
    /// Labels containing "pos" are positive, labels containing "neg" are
    /// negative, everything else (including `LABEL_1` style ids) is neutral.
    pub fn from_provider_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("pos") {
            Self::Positive
        } else if label.contains("neg") {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single label/score candidate produced by a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// Pick the highest-scoring candidate
    pub fn best(candidates: &[LabelScore]) -> Option<&LabelScore> {
        candidates
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// Canonical label for this candidate
    pub fn sentiment(&self) -> SentimentLabel {
        SentimentLabel::from_provider_label(&self.label)
    }
}

/// Tally of sentiment labels.
///
/// `total` always equals `positive + neutral + negative`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub total: u64,
}

impl MoodCounts {
    /// Count one label
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
        self.total += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Positive share minus negative share, or `None` without data
    pub fn delta(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let total = self.total as f64;
        Some(self.positive as f64 / total - self.negative as f64 / total)
    }
}

impl FromIterator<SentimentLabel> for MoodCounts {
    fn from_iter<I: IntoIterator<Item = SentimentLabel>>(iter: I) -> Self {
        let mut counts = Self::default();
        for label in iter {
            counts.record(label);
        }
        counts
    }
}

/// Computed mood for one scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMood {
    /// ISO2 code, `None` for the global scope
    pub scope_id: Option<String>,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub total: u64,
    /// Top topic words, most frequent first
    pub topics: Vec<String>,
    pub insight: String,
    pub computed_at: DateTime<Utc>,
}

impl CountryMood {
    pub fn new(
        scope: &Scope,
        counts: MoodCounts,
        topics: Vec<String>,
        insight: impl Into<String>,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scope_id: scope.country_code().map(str::to_string),
            positive: counts.positive,
            neutral: counts.neutral,
            negative: counts.negative,
            total: counts.total,
            topics,
            insight: insight.into(),
            computed_at,
        }
    }

    pub fn counts(&self) -> MoodCounts {
        MoodCounts {
            positive: self.positive,
            neutral: self.neutral,
            negative: self.negative,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parse() {
        assert_eq!(Scope::parse(None).unwrap(), Scope::Global);
        assert_eq!(Scope::parse(Some("  ")).unwrap(), Scope::Global);
        assert_eq!(
            Scope::parse(Some("fr")).unwrap(),
            Scope::Country("FR".to_string())
        );
        assert_eq!(
            Scope::parse(Some(" De ")).unwrap(),
            Scope::Country("DE".to_string())
        );
        assert!(Scope::parse(Some("FRA")).is_err());
        assert!(Scope::parse(Some("-99")).is_err());
    }

    #[test]
    fn test_cache_keys() {
        assert_eq!(Scope::Global.cache_key(), "global");
        assert_eq!(Scope::country("us").unwrap().cache_key(), "cc:US");
    }

    #[test]
    fn test_provider_label_mapping() {
        assert_eq!(
            SentimentLabel::from_provider_label("POSITIVE"),
            SentimentLabel::Positive
        );
        assert_eq!(
            SentimentLabel::from_provider_label("negative"),
            SentimentLabel::Negative
        );
        assert_eq!(
            SentimentLabel::from_provider_label("LABEL_1"),
            SentimentLabel::Neutral
        );
        assert_eq!(
            SentimentLabel::from_provider_label("neutral"),
            SentimentLabel::Neutral
        );
    }

    #[test]
    fn test_best_candidate() {
        let candidates = vec![
            LabelScore::new("negative", 0.1),
            LabelScore::new("positive", 0.7),
            LabelScore::new("neutral", 0.2),
        ];
        let best = LabelScore::best(&candidates).unwrap();
        assert_eq!(best.sentiment(), SentimentLabel::Positive);
        assert!(LabelScore::best(&[]).is_none());
    }

    #[test]
    fn test_counts_delta() {
        let labels = [
            vec![SentimentLabel::Positive; 7],
            vec![SentimentLabel::Neutral; 1],
            vec![SentimentLabel::Negative; 2],
        ]
        .concat();
        let counts: MoodCounts = labels.into_iter().collect();
        assert_eq!(counts.total, 10);
        assert!((counts.delta().unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(MoodCounts::default().delta(), None);
    }

    #[test]
    fn test_country_mood_scope_id() {
        let mood = CountryMood::new(
            &Scope::Global,
            MoodCounts::default(),
            Vec::new(),
            "quiet",
            Utc::now(),
        );
        assert_eq!(mood.scope_id, None);

        let json = serde_json::to_value(&mood).unwrap();
        assert!(json["scope_id"].is_null());
        assert_eq!(json["total"], 0);
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        fn label() -> impl Strategy<Value = SentimentLabel> {
            prop_oneof![
                Just(SentimentLabel::Positive),
                Just(SentimentLabel::Neutral),
                Just(SentimentLabel::Negative),
            ]
        }

        proptest! {
            #[test]
            fn counts_total_matches_len(labels in prop::collection::vec(label(), 0..200)) {
                let counts: MoodCounts = labels.iter().copied().collect();
                prop_assert_eq!(counts.total, labels.len() as u64);
                prop_assert_eq!(counts.positive + counts.neutral + counts.negative, counts.total);
            }
        }
    }
}
