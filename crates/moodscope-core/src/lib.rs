//! MoodScope Core
//!
//! Core types and error handling shared across MoodScope components.
//!
//! This crate provides:
//! - Scope identifiers (global or ISO 3166-1 alpha-2 country) and cache keys
//! - Sentiment labels and the mood tally
//! - Character-safe text truncation
//! - The computed `CountryMood` result
//! - Error types and result handling

pub mod error;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use text::truncate_chars;
pub use types::{CountryMood, LabelScore, MoodCounts, Scope, SentimentLabel};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{CountryMood, LabelScore, MoodCounts, Scope, SentimentLabel};
}
