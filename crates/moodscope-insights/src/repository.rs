//! Text sample sources
//!
//! `TextRepository` is the boundary to whatever stores user content. The
//! file-backed implementation reads a JSON export so the pipeline can run
//! without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moodscope_core::{Error, Result, Scope};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How many samples to take from each content source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleBudget {
    /// Top-level posts
    pub posts: usize,
    /// Comments on posts
    pub comments: usize,
}

impl SampleBudget {
    /// Split `total` samples, giving `primary_share` of them to posts.
    ///
    /// The share is clamped to `[0, 1]` and the post count rounded down, so
    /// `split(500, 0.6)` is 300 posts and 200 comments.
    pub fn split(total: usize, primary_share: f64) -> Self {
        let share = if primary_share.is_nan() {
            0.0
        } else {
            primary_share.clamp(0.0, 1.0)
        };
        let posts = ((total as f64) * share).floor() as usize;
        let posts = posts.min(total);
        Self {
            posts,
            comments: total - posts,
        }
    }

    pub fn total(&self) -> usize {
        self.posts + self.comments
    }
}

/// Source of recent user text
#[async_trait]
pub trait TextRepository: Send + Sync {
    /// Recent texts for `scope`, newest first, at most `budget.total()` items
    async fn fetch_texts(&self, scope: &Scope, budget: SampleBudget) -> Result<Vec<String>>;

    /// Country codes that have content
    async fn list_known_scopes(&self) -> Result<BTreeSet<String>>;
}

/// One stored post or comment
#[derive(Debug, Clone, Deserialize)]
pub struct TextRecord {
    #[serde(default)]
    pub country_code: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl TextRecord {
    fn matches(&self, scope: &Scope) -> bool {
        match scope.country_code() {
            None => true,
            Some(code) => self
                .country_code
                .as_deref()
                .is_some_and(|cc| cc.trim().eq_ignore_ascii_case(code)),
        }
    }
}

/// Layout of the data file
#[derive(Debug, Default, Deserialize)]
pub struct TextDump {
    #[serde(default)]
    pub posts: Vec<TextRecord>,
    #[serde(default)]
    pub comments: Vec<TextRecord>,
}

impl TextDump {
    fn recent(records: &[TextRecord], scope: &Scope, limit: usize) -> Vec<String> {
        let mut matching: Vec<&TextRecord> = records
            .iter()
            .filter(|r| r.matches(scope) && !r.text.trim().is_empty())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
            .into_iter()
            .take(limit)
            .map(|r| r.text.clone())
            .collect()
    }

    /// Newest posts then newest comments for `scope`, within `budget`
    pub fn select(&self, scope: &Scope, budget: SampleBudget) -> Vec<String> {
        let mut texts = Self::recent(&self.posts, scope, budget.posts);
        texts.extend(Self::recent(&self.comments, scope, budget.comments));
        texts
    }

    /// Country codes present in either source, upper-cased
    pub fn country_codes(&self) -> BTreeSet<String> {
        self.posts
            .iter()
            .chain(&self.comments)
            .filter_map(|r| r.country_code.as_deref())
            .map(|cc| cc.trim().to_ascii_uppercase())
            .filter(|cc| !cc.is_empty())
            .collect()
    }
}

/// Repository backed by a JSON file, re-read on every call
#[derive(Debug, Clone)]
pub struct FileTextRepository {
    path: PathBuf,
}

impl FileTextRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<TextDump> {
        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::repository(format!("failed to read {}: {e}", self.path.display()))
        })?;
        serde_json::from_slice(&raw).map_err(|e| {
            Error::repository(format!("failed to parse {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl TextRepository for FileTextRepository {
    async fn fetch_texts(&self, scope: &Scope, budget: SampleBudget) -> Result<Vec<String>> {
        let dump = self.load().await?;
        let texts = dump.select(scope, budget);
        debug!(scope = %scope, samples = texts.len(), "Fetched text samples");
        Ok(texts)
    }

    async fn list_known_scopes(&self) -> Result<BTreeSet<String>> {
        Ok(self.load().await?.country_codes())
    }
}
