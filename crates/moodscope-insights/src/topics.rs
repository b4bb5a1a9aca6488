//! Frequency-ranked topic extraction

use crate::normalize::TextNormalizer;
use moodscope_core::Result;
use std::collections::{HashMap, HashSet};

/// Default number of topics kept per scope
pub const DEFAULT_TOPIC_LIMIT: usize = 10;

/// Words shorter than this are never topics
pub const MIN_TOPIC_CHARS: usize = 3;

/// Closed list of English function words and first-person pronouns
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "your", "yours", "all", "any", "can", "had",
    "her", "hers", "was", "one", "our", "ours", "out", "has", "have", "him", "his", "how", "its",
    "may", "now", "off", "own", "she", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "too", "very", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "would", "could", "should", "shall", "about", "above",
    "after", "again", "against", "also", "because", "been", "before", "being", "below",
    "between", "both", "did", "does", "doing", "done", "down", "during", "each", "few", "from",
    "further", "get", "got", "here", "into", "just", "more", "most", "much", "myself", "mine",
    "nor", "only", "other", "over", "same", "some", "such", "through", "under", "until", "upon",
    "were", "yet", "ourselves", "yourself", "yourselves", "himself", "herself", "itself",
    "themselves", "let", "like", "lets", "dont", "cant", "wont", "isnt", "arent", "wasnt", "its",
    "ive", "ill", "im", "id", "me", "my", "we", "us", "is", "it", "in", "on", "at", "to", "of",
    "or", "an", "as", "be", "by", "do", "if", "no", "so", "up", "a", "i",
];

/// Ranks non-stopword tokens by frequency across a batch of texts
pub struct TopicExtractor {
    normalizer: TextNormalizer,
    stopwords: HashSet<&'static str>,
}

impl TopicExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self::with_normalizer(TextNormalizer::new()?))
    }

    pub fn with_normalizer(normalizer: TextNormalizer) -> Self {
        Self {
            normalizer,
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Top `limit` words, most frequent first; ties keep first-seen order
    pub fn extract<S: AsRef<str>>(&self, texts: &[S], limit: usize) -> Vec<String> {
        if limit == 0 {
            return Vec::new();
        }

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in self.normalizer.tokenize(text.as_ref()) {
                if word.chars().count() < MIN_TOPIC_CHARS || self.is_stopword(&word) {
                    continue;
                }
                match counts.get_mut(&word) {
                    Some(count) => *count += 1,
                    None => {
                        counts.insert(word.clone(), 1);
                        order.push(word);
                    }
                }
            }
        }

        // Stable sort keeps encounter order among equal counts
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.truncate(limit);
        order
    }
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self::with_normalizer(TextNormalizer::default())
    }
}
