//! Remote inference tier
//!
//! Sends the whole batch in one bearer-authenticated request:
//!
//! ```text
//! POST <endpoint>
//! {"inputs": ["text one", "text two"]}
//! ```
//!
//! and expects one candidate list per input:
//!
//! ```text
//! [[{"label": "positive", "score": 0.93}, {"label": "negative", "score": 0.02}], ...]
//! ```
//!
//! Timeouts and 502/503/504 degrade the batch to neutral. A missing token
//! and every other failure are hard errors.

use crate::classifier::{DegradeReason, RemoteOutcome};
use moodscope_core::{Error, LabelScore, Result, SentimentLabel};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Credential name reported when no token is configured
pub const REMOTE_TOKEN_ENV: &str = "MOODSCOPE_REMOTE_TOKEN";

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batched(Vec<Vec<LabelScore>>),
    Single(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_entries(self) -> Vec<Vec<LabelScore>> {
        match self {
            Self::Batched(entries) => entries,
            Self::Single(candidates) => vec![candidates],
        }
    }
}

pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl RemoteClassifier {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            timeout,
        }
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Classify a batch with a single request
    pub async fn classify(&self, texts: &[String]) -> Result<RemoteOutcome> {
        if texts.is_empty() {
            return Ok(RemoteOutcome::Classified(Vec::new()));
        }

        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::missing_credential(REMOTE_TOKEN_ENV))?;

        let exchange = async {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(token)
                .json(&InferenceRequest { inputs: texts })
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.timeout, exchange).await {
            Err(_) => {
                warn!(
                    "Remote classifier timed out after {:?}; labelling {} texts neutral",
                    self.timeout,
                    texts.len()
                );
                return Ok(RemoteOutcome::degraded(DegradeReason::Timeout, texts.len()));
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!("Remote classifier request timed out: {}", e);
                return Ok(RemoteOutcome::degraded(DegradeReason::Timeout, texts.len()));
            }
            Ok(Err(e)) => {
                return Err(Error::remote(format!(
                    "request to {} failed: {e}",
                    self.endpoint
                )))
            }
            Ok(Ok(exchange)) => exchange,
        };

        if !status.is_success() {
            if is_temporarily_unavailable(status) {
                warn!(
                    "Remote classifier unavailable ({}); labelling {} texts neutral",
                    status,
                    texts.len()
                );
                return Ok(RemoteOutcome::degraded(
                    DegradeReason::ServiceUnavailable,
                    texts.len(),
                ));
            }
            return Err(Error::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let entries = serde_json::from_str::<InferenceResponse>(&body)
            .map_err(|e| Error::remote(format!("unexpected response body: {e}")))?
            .into_entries();

        if entries.len() != texts.len() {
            debug!(
                "Remote classifier returned {} entries for {} texts; missing entries are neutral",
                entries.len(),
                texts.len()
            );
        }

        Ok(RemoteOutcome::Classified(select_labels(&entries, texts.len())))
    }
}

fn is_temporarily_unavailable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Highest-scoring candidate per text; absent or empty entries are neutral
fn select_labels(entries: &[Vec<LabelScore>], len: usize) -> Vec<SentimentLabel> {
    (0..len)
        .map(|i| {
            entries
                .get(i)
                .and_then(|candidates| LabelScore::best(candidates))
                .map(LabelScore::sentiment)
                .unwrap_or(SentimentLabel::Neutral)
        })
        .collect()
}
