//! Mock collaborators for insights tests
//!
//! Repositories and classifiers with call counters, per-scope failures and
//! simulated latency.

#![allow(dead_code)]

use async_trait::async_trait;
use moodscope_classifiers::BatchClassifier;
use moodscope_core::{Error, Result, Scope, SentimentLabel};
use moodscope_insights::{SampleBudget, TextRepository};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Repository serving fixed texts per scope key
pub struct MockRepository {
    texts: HashMap<String, Vec<String>>,
    known: Vec<String>,
    failing: HashSet<String>,
    list_fails: bool,
    fetch_count: AtomicU32,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            texts: HashMap::new(),
            known: Vec::new(),
            failing: HashSet::new(),
            list_fails: false,
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Serve `texts` for `scope` (`None` for global)
    pub fn with_texts(mut self, scope: Option<&str>, texts: &[&str]) -> Self {
        let key = Scope::parse(scope).unwrap().cache_key();
        self.texts
            .insert(key, texts.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_known(mut self, codes: &[&str]) -> Self {
        self.known = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Make fetches for `scope` fail
    pub fn failing_for(mut self, scope: Option<&str>) -> Self {
        self.failing
            .insert(Scope::parse(scope).unwrap().cache_key());
        self
    }

    pub fn with_failing_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRepository for MockRepository {
    async fn fetch_texts(&self, scope: &Scope, budget: SampleBudget) -> Result<Vec<String>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let key = scope.cache_key();
        if self.failing.contains(&key) {
            return Err(Error::repository(format!("connection reset while reading {key}")));
        }
        Ok(self
            .texts
            .get(&key)
            .map(|texts| texts.iter().take(budget.total()).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_known_scopes(&self) -> Result<BTreeSet<String>> {
        if self.list_fails {
            return Err(Error::repository("scope listing unavailable"));
        }
        Ok(self.known.iter().cloned().collect())
    }
}

/// Classifier that labels texts by keyword, or fails on demand
pub struct MockClassifier {
    error: Option<fn() -> Error>,
    latency: Option<Duration>,
    call_count: AtomicU32,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            error: None,
            latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn failing(error: fn() -> Error) -> Self {
        Self {
            error: Some(error),
            ..Self::new()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BatchClassifier for MockClassifier {
    async fn classify(&self, texts: &[String]) -> Result<Vec<SentimentLabel>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.error {
            return Err(error());
        }

        Ok(texts
            .iter()
            .map(|text| {
                if text.contains("good") {
                    SentimentLabel::Positive
                } else if text.contains("bad") {
                    SentimentLabel::Negative
                } else {
                    SentimentLabel::Neutral
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// 7 positive, 1 neutral and 2 negative samples
pub fn optimistic_texts() -> Vec<&'static str> {
    vec![
        "good news about the metro",
        "good weather for the festival",
        "good metro service today",
        "festival was good fun",
        "good food at the festival",
        "metro upgrades look good",
        "good vibes downtown",
        "metro delays again",
        "bad traffic near the festival",
        "bad rain all day",
    ]
}
