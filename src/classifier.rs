use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::error::{LoadError, LoadResult, PredictError, PredictResult};
use crate::model::{BertForSequenceClassification, Config};
use crate::tokenizer;

/// Text in, per-class logits out. Implementations are shared read-only
/// across request handlers.
pub trait SequenceClassifier: Send + Sync {
    fn logits(&self, text: &str) -> PredictResult<Vec<f32>>;

    fn num_labels(&self) -> usize;
}

pub struct BertClassifier {
    model: BertForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
}

impl BertClassifier {
    /// Load `config.json`, the tokenizer and the weights from `path`.
    pub fn load<P: AsRef<Path>>(path: P, device: Device, max_length: usize) -> LoadResult<Self> {
        let mut dir = PathBuf::from(path.as_ref());
        if !dir.is_dir() {
            return Err(LoadError::MissingDir(dir));
        }

        dir.push("config.json");
        let config = Config::from_file(&dir)?;
        dir.pop();

        let max_positions = config.bert_config.max_position_embeddings;
        if max_length > max_positions {
            return Err(LoadError::MaxLength {
                max_length,
                max_positions,
            });
        }

        let tokenizer = tokenizer::load(&dir, max_length)?;

        let vb = weights(&dir, &device)?;
        let model = BertForSequenceClassification::load(vb, &config).map_err(LoadError::Model)?;

        tracing::info!(
            path = %dir.display(),
            num_labels = model.num_labels(),
            max_length,
            "Loaded BERT sequence classifier"
        );
        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

fn weights(dir: &Path, device: &Device) -> LoadResult<VarBuilder<'static>> {
    let safetensors = dir.join("model.safetensors");
    if safetensors.is_file() {
        // SAFETY: the file is mapped read-only and not modified while served.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&safetensors], DType::F32, device)
        };
        return vb.map_err(|source| LoadError::Weights {
            path: safetensors,
            source,
        });
    }

    let pth = dir.join("pytorch_model.bin");
    if pth.is_file() {
        return VarBuilder::from_pth(&pth, DType::F32, device).map_err(|source| {
            LoadError::Weights { path: pth, source }
        });
    }

    Err(LoadError::MissingWeights(dir.to_path_buf()))
}

impl SequenceClassifier for BertClassifier {
    fn logits(&self, text: &str) -> PredictResult<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(PredictError::Encode)?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self
            .model
            .forward(&input_ids, &token_type_ids, &attention_mask)?;
        let logits: Vec<f32> = logits.squeeze(0)?.to_dtype(DType::F32)?.to_vec1()?;
        Ok(logits)
    }

    fn num_labels(&self) -> usize {
        self.model.num_labels()
    }
}
