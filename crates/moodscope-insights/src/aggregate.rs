//! Label tallying and insight synthesis

use moodscope_core::{MoodCounts, SentimentLabel};
use std::fmt;

/// Insight used when a scope has no samples
pub const EMPTY_INSIGHT: &str = "Not enough recent posts to summarize yet.";

/// Positive-minus-negative share beyond which the mood leans one way
pub const MOOD_THRESHOLD: f64 = 0.12;

/// Topics mentioned in the insight sentence
pub const INSIGHT_THEMES: usize = 4;

/// Overall leaning of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Optimistic,
    Mixed,
    Tense,
}

impl Mood {
    /// Classify a tally, or `None` when there is nothing to classify
    pub fn from_counts(counts: &MoodCounts) -> Option<Self> {
        let delta = counts.delta()?;
        Some(if delta > MOOD_THRESHOLD {
            Self::Optimistic
        } else if delta < -MOOD_THRESHOLD {
            Self::Tense
        } else {
            Self::Mixed
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimistic => "optimistic",
            Self::Mixed => "mixed",
            Self::Tense => "tense",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tally labels
pub fn aggregate(labels: &[SentimentLabel]) -> MoodCounts {
    labels.iter().copied().collect()
}

/// Render the one-sentence insight for a tally and its topics
pub fn synthesize<S: AsRef<str>>(counts: &MoodCounts, topics: &[S]) -> String {
    let Some(mood) = Mood::from_counts(counts) else {
        return EMPTY_INSIGHT.to_string();
    };

    if topics.is_empty() {
        return format!("Overall mood feels {mood} across a wide mix of conversation.");
    }

    let themes = topics
        .iter()
        .take(INSIGHT_THEMES)
        .map(|topic| capitalize(topic.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Overall mood feels {mood}. Top themes: {themes}.")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentLabel::{Negative, Neutral, Positive};

    fn counts(positive: usize, neutral: usize, negative: usize) -> MoodCounts {
        let labels = [
            vec![Positive; positive],
            vec![Neutral; neutral],
            vec![Negative; negative],
        ]
        .concat();
        aggregate(&labels)
    }

    #[test]
    fn test_aggregate_tally() {
        let tally = aggregate(&[Positive, Negative, Neutral, Positive]);
        assert_eq!(
            tally,
            MoodCounts {
                positive: 2,
                neutral: 1,
                negative: 1,
                total: 4
            }
        );
        assert_eq!(aggregate(&[]), MoodCounts::default());
    }

    #[test]
    fn test_empty_insight() {
        assert_eq!(
            synthesize::<&str>(&MoodCounts::default(), &[]),
            "Not enough recent posts to summarize yet."
        );
    }

    #[test]
    fn test_optimistic_with_topics() {
        let tally = counts(7, 1, 2);
        assert_eq!(Mood::from_counts(&tally), Some(Mood::Optimistic));

        let insight = synthesize(&tally, &["metro", "strike", "paris", "weather", "budget"]);
        assert_eq!(
            insight,
            "Overall mood feels optimistic. Top themes: Metro, Strike, Paris, Weather."
        );
    }

    #[test]
    fn test_tense_without_topics() {
        let tally = counts(1, 2, 7);
        assert_eq!(
            synthesize::<&str>(&tally, &[]),
            "Overall mood feels tense across a wide mix of conversation."
        );
    }

    #[test]
    fn test_threshold_boundaries() {
        // delta exactly 0.12 is not above the threshold
        assert_eq!(Mood::from_counts(&counts(12, 88, 0)), Some(Mood::Mixed));
        assert_eq!(Mood::from_counts(&counts(13, 87, 0)), Some(Mood::Optimistic));
        assert_eq!(Mood::from_counts(&counts(0, 88, 12)), Some(Mood::Mixed));
        assert_eq!(Mood::from_counts(&counts(0, 87, 13)), Some(Mood::Tense));
        assert_eq!(Mood::from_counts(&MoodCounts::default()), None);
    }

    #[test]
    fn test_capitalize_unicode() {
        assert_eq!(capitalize("école"), "École");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let tally = counts(3, 3, 3);
        let topics = ["rain", "trains"];
        assert_eq!(synthesize(&tally, &topics), synthesize(&tally, &topics));
        assert!(synthesize(&tally, &topics).contains("mixed"));
    }
}
