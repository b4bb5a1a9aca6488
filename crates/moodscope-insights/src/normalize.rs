//! Text normalization
//!
//! Lowercases, strips URLs, `@mentions`, `#hashtags` and markup, drops every
//! character that is not a letter, number or whitespace, and collapses
//! whitespace. The output is stable under a second pass.

use moodscope_core::{Error, Result};
use regex::Regex;

/// Text normalizer using precompiled patterns
pub struct TextNormalizer {
    url_regex: Regex,
    tag_regex: Regex,
    handle_regex: Regex,
}

impl TextNormalizer {
    /// Create a new normalizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            url_regex: Regex::new(r"(?:https?://|www\.)\S+")
                .map_err(|e| Error::internal(format!("Failed to compile URL regex: {e}")))?,
            tag_regex: Regex::new(r"</?[a-zA-Z][^<>]*>")
                .map_err(|e| Error::internal(format!("Failed to compile markup regex: {e}")))?,
            handle_regex: Regex::new(r"(?:^|\s)[@#]\S*")
                .map_err(|e| Error::internal(format!("Failed to compile handle regex: {e}")))?,
        })
    }

    /// Normalize one text
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let without_urls = self.url_regex.replace_all(&lowered, " ");
        let without_tags = self.tag_regex.replace_all(&without_urls, " ");
        let without_handles = self.handle_regex.replace_all(&without_tags, " ");

        let kept: String = without_handles
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();

        kept.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Normalize and split into words
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new().expect("Failed to create text normalizer")
    }
}
