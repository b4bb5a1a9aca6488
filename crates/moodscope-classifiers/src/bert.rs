//! Candle-backed BERT sequence classifier for the on-box tier
//!
//! Expects a Hugging Face style model directory (`config.json`,
//! `tokenizer.json`, `model.safetensors`) holding a
//! `BertForSequenceClassification` checkpoint. Without the `ml-models`
//! feature the factory always fails, which routes batches to the remote tier.

use crate::classifier::{LocalPipeline, PipelineFactory};
use async_trait::async_trait;
use moodscope_core::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Where the model files come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BertSource {
    /// Directory on the local filesystem
    Local { path: PathBuf },

    /// Download from Hugging Face Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

fn default_revision() -> String {
    "main".to_string()
}

/// Builds a [`BertPipeline`] on first use
#[derive(Debug, Clone)]
pub struct BertFactory {
    pub source: BertSource,
    /// Label names by class index; read from `config.json` when absent
    pub labels: Option<Vec<String>>,
    /// Token budget per text
    pub max_length: usize,
    /// "cpu", "cuda" or "metal"
    pub device: String,
}

impl BertFactory {
    pub fn new(source: BertSource) -> Self {
        Self {
            source,
            labels: None,
            max_length: 512,
            device: "cpu".to_string(),
        }
    }
}

#[async_trait]
impl PipelineFactory for BertFactory {
    async fn build(&self) -> Result<Arc<dyn LocalPipeline>> {
        #[cfg(feature = "ml-models")]
        {
            let factory = self.clone();
            let pipeline = tokio::task::spawn_blocking(move || imp::BertPipeline::load(&factory))
                .await
                .map_err(|e| {
                    moodscope_core::Error::classifier(format!("BERT loader task failed: {e}"))
                })??;
            Ok(Arc::new(pipeline))
        }

        #[cfg(not(feature = "ml-models"))]
        {
            Err(moodscope_core::Error::classifier(
                "BERT pipeline requires the 'ml-models' feature",
            ))
        }
    }

    fn describe(&self) -> String {
        match &self.source {
            BertSource::Local { path } => format!("bert:{}", path.display()),
            BertSource::HuggingFace { repo, revision } => format!("bert:{repo}@{revision}"),
        }
    }
}

#[cfg(feature = "ml-models")]
pub use imp::BertPipeline;

#[cfg(feature = "ml-models")]
mod imp {
    use super::{BertFactory, BertSource};
    use crate::classifier::{LocalPipeline, PipelineFactory};
    use async_trait::async_trait;
    use candle_core::{DType, Device, Module, Tensor, D};
    use candle_nn::{Linear, VarBuilder};
    use candle_transformers::models::bert::{BertModel, Config as BertConfig};
    use moodscope_core::{Error, LabelScore, Result};
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokenizers::Tokenizer;

    fn candle_err(context: &str) -> impl Fn(candle_core::Error) -> Error + '_ {
        move |e| Error::classifier(format!("{context}: {e}"))
    }

    /// Fields of `config.json` the classification head needs
    #[derive(Deserialize)]
    struct HeadConfig {
        hidden_size: usize,
        #[serde(default)]
        id2label: HashMap<String, String>,
    }

    struct ModelFiles {
        config: PathBuf,
        tokenizer: PathBuf,
        weights: PathBuf,
    }

    pub struct BertPipeline {
        name: String,
        inner: Arc<Inner>,
    }

    struct Inner {
        tokenizer: Tokenizer,
        model: BertModel,
        pooler: Linear,
        classifier: Linear,
        labels: Vec<String>,
        device: Device,
        max_length: usize,
    }

    impl BertPipeline {
        pub(super) fn load(factory: &BertFactory) -> Result<Self> {
            let files = resolve_files(&factory.source)?;

            let tokenizer = Tokenizer::from_file(&files.tokenizer)
                .map_err(|e| Error::classifier(format!("Failed to load tokenizer: {e}")))?;

            let raw_config = std::fs::read_to_string(&files.config)?;
            let bert_config: BertConfig = serde_json::from_str(&raw_config)?;
            let head: HeadConfig = serde_json::from_str(&raw_config)?;

            let labels = match &factory.labels {
                Some(labels) => labels.clone(),
                None => labels_from_config(&head.id2label),
            };
            if labels.is_empty() {
                return Err(Error::config(
                    "BERT pipeline needs labels (config.json id2label or explicit list)",
                ));
            }

            let device = match factory.device.as_str() {
                "cuda" => Device::new_cuda(0).map_err(candle_err("Failed to initialize CUDA"))?,
                "metal" => Device::new_metal(0).map_err(candle_err("Failed to initialize Metal"))?,
                _ => Device::Cpu,
            };

            // SAFETY: the weights file is not modified while mapped.
            let vb = unsafe {
                VarBuilder::from_mmaped_safetensors(&[files.weights], DType::F32, &device)
                    .map_err(candle_err("Failed to load weights"))?
            };

            let model = BertModel::load(vb.clone(), &bert_config)
                .map_err(candle_err("Failed to load BERT model"))?;
            let pooler = candle_nn::linear(
                head.hidden_size,
                head.hidden_size,
                vb.pp("bert.pooler.dense"),
            )
            .map_err(candle_err("Failed to load pooler"))?;
            let classifier =
                candle_nn::linear(head.hidden_size, labels.len(), vb.pp("classifier"))
                    .map_err(candle_err("Failed to load classification head"))?;

            tracing::info!("Loaded BERT sentiment pipeline with {} labels", labels.len());

            Ok(Self {
                name: factory.describe(),
                inner: Arc::new(Inner {
                    tokenizer,
                    model,
                    pooler,
                    classifier,
                    labels,
                    device,
                    max_length: factory.max_length,
                }),
            })
        }
    }

    fn resolve_files(source: &BertSource) -> Result<ModelFiles> {
        match source {
            BertSource::Local { path } => {
                if !path.exists() {
                    return Err(Error::config(format!(
                        "Model directory does not exist: {}",
                        path.display()
                    )));
                }
                Ok(ModelFiles {
                    config: path.join("config.json"),
                    tokenizer: path.join("tokenizer.json"),
                    weights: path.join("model.safetensors"),
                })
            }
            BertSource::HuggingFace { repo, revision } => {
                let api = hf_hub::api::sync::Api::new()
                    .map_err(|e| Error::config(format!("Failed to initialize HF API: {e}")))?;
                let repo = api.repo(hf_hub::Repo::with_revision(
                    repo.clone(),
                    hf_hub::RepoType::Model,
                    revision.clone(),
                ));
                let get = |file: &str| {
                    repo.get(file)
                        .map_err(|e| Error::config(format!("Failed to download {file}: {e}")))
                };
                Ok(ModelFiles {
                    config: get("config.json")?,
                    tokenizer: get("tokenizer.json")?,
                    weights: get("model.safetensors")?,
                })
            }
        }
    }

    fn labels_from_config(id2label: &HashMap<String, String>) -> Vec<String> {
        let mut indexed: Vec<(usize, &String)> = id2label
            .iter()
            .filter_map(|(id, label)| id.parse().ok().map(|id| (id, label)))
            .collect();
        indexed.sort_by_key(|(id, _)| *id);
        indexed.into_iter().map(|(_, label)| label.clone()).collect()
    }

    impl Inner {
        fn classify_one(&self, text: &str) -> Result<LabelScore> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| Error::classifier(format!("Tokenization failed: {e}")))?;

            let len = encoding.get_ids().len().min(self.max_length);
            let input_ids = Tensor::new(&encoding.get_ids()[..len], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(candle_err("Failed to create input tensor"))?;
            let token_type_ids = Tensor::new(&encoding.get_type_ids()[..len], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(candle_err("Failed to create token type tensor"))?;

            let hidden = self
                .model
                .forward(&input_ids, &token_type_ids, None)
                .map_err(candle_err("Model forward pass failed"))?;

            let probs = hidden
                .narrow(1, 0, 1)
                .and_then(|cls| cls.squeeze(1))
                .and_then(|cls| self.pooler.forward(&cls))
                .and_then(|pooled| pooled.tanh())
                .and_then(|pooled| self.classifier.forward(&pooled))
                .and_then(|logits| candle_nn::ops::softmax(&logits, D::Minus1))
                .and_then(|probs| probs.squeeze(0))
                .and_then(|probs| probs.to_vec1::<f32>())
                .map_err(candle_err("Classification head failed"))?;

            let (index, score) = probs
                .iter()
                .copied()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .ok_or_else(|| Error::classifier("Model produced no class scores"))?;

            let label = self
                .labels
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("LABEL_{index}"));

            Ok(LabelScore::new(label, score))
        }
    }

    #[async_trait]
    impl LocalPipeline for BertPipeline {
        async fn classify_batch(&self, texts: &[String]) -> Result<Vec<LabelScore>> {
            let inner = Arc::clone(&self.inner);
            let texts = texts.to_vec();
            tokio::task::spawn_blocking(move || {
                texts
                    .iter()
                    .map(|text| inner.classify_one(text))
                    .collect::<Result<Vec<_>>>()
            })
            .await
            .map_err(|e| Error::classifier(format!("BERT inference task failed: {e}")))?
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_yaml() {
        let source: BertSource = serde_yaml::from_str(
            "type: huggingface\nrepo: cardiffnlp/twitter-roberta-base-sentiment-latest\n",
        )
        .unwrap();
        assert_eq!(
            source,
            BertSource::HuggingFace {
                repo: "cardiffnlp/twitter-roberta-base-sentiment-latest".to_string(),
                revision: "main".to_string(),
            }
        );
    }

    #[cfg(not(feature = "ml-models"))]
    #[tokio::test]
    async fn test_build_without_feature_fails() {
        let factory = BertFactory::new(BertSource::Local {
            path: PathBuf::from("./models/sentiment"),
        });
        let err = factory.build().await.err().unwrap();
        assert!(err.to_string().contains("ml-models"));
        assert_eq!(factory.describe(), "bert:./models/sentiment");
    }
}
