//! Country boundary dataset
//!
//! Only the ISO2 codes are used: they seed the list of scopes refreshed by a
//! batch run. Loading is best effort.

use moodscope_core::{Error, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Property names that may carry the ISO2 code
const ISO2_KEYS: &[&str] = &["iso2", "ISO_A2", "iso_a2", "cca2"];

/// Boundary file, parsed at most once successfully
#[derive(Debug, Default)]
pub struct GeoDataset {
    path: Option<PathBuf>,
    codes: OnceCell<BTreeSet<String>>,
}

impl GeoDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            codes: OnceCell::new(),
        }
    }

    /// A dataset that contributes nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// ISO2 codes from the dataset, upper-cased.
    ///
    /// A missing or unparseable file yields an empty set and is retried on
    /// the next call.
    pub async fn country_codes(&self) -> BTreeSet<String> {
        let Some(path) = &self.path else {
            return BTreeSet::new();
        };

        match self.codes.get_or_try_init(|| load(path)).await {
            Ok(codes) => codes.clone(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Geo dataset unavailable");
                BTreeSet::new()
            }
        }
    }
}

async fn load(path: &Path) -> Result<BTreeSet<String>> {
    let raw = tokio::fs::read(path).await?;
    let document: Value = serde_json::from_slice(&raw)?;
    let codes = extract_codes(&document)?;
    debug!(path = %path.display(), countries = codes.len(), "Loaded geo dataset");
    Ok(codes)
}

/// Pull ISO2 codes out of a FeatureCollection or a plain array of records
pub fn extract_codes(document: &Value) -> Result<BTreeSet<String>> {
    let records: Vec<&Value> = match document {
        Value::Object(map) => match map.get("features") {
            Some(Value::Array(features)) => features
                .iter()
                .filter_map(|feature| feature.get("properties"))
                .collect(),
            _ => {
                return Err(Error::config(
                    "geo dataset object has no 'features' array",
                ))
            }
        },
        Value::Array(items) => items.iter().collect(),
        _ => return Err(Error::config("geo dataset must be an object or an array")),
    };

    Ok(records
        .into_iter()
        .filter_map(|record| {
            ISO2_KEYS
                .iter()
                .find_map(|key| record.get(*key).and_then(Value::as_str))
        })
        .map(|code| code.trim().to_ascii_uppercase())
        .filter(|code| !code.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_collection() {
        let document = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"ISO_A2": "FR", "NAME": "France"}},
                {"type": "Feature", "properties": {"iso_a2": "de"}},
                {"type": "Feature", "properties": {"ISO_A2": "-99"}},
                {"type": "Feature", "properties": {"NAME": "Nowhere"}}
            ]
        });
        let codes: Vec<_> = extract_codes(&document).unwrap().into_iter().collect();
        assert_eq!(codes, vec!["-99", "DE", "FR"]);
    }

    #[test]
    fn test_plain_array() {
        let document = json!([{"cca2": "jp"}, {"iso2": "BR"}, {"name": "x"}]);
        let codes: Vec<_> = extract_codes(&document).unwrap().into_iter().collect();
        assert_eq!(codes, vec!["BR", "JP"]);
    }

    #[test]
    fn test_unexpected_shape() {
        assert!(extract_codes(&json!({"type": "Feature"})).is_err());
        assert!(extract_codes(&json!("FR")).is_err());
    }

    #[tokio::test]
    async fn test_no_path_is_empty() {
        assert!(GeoDataset::empty().country_codes().await.is_empty());
    }
}
