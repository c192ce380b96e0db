use std::path::PathBuf;

/// Failure to bring the classifier up. Always fatal: the server never binds
/// a socket when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("model directory {0} does not exist or is not a directory")]
    MissingDir(PathBuf),
    #[error("failed to read model config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse model config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to load tokenizer from {path}: {source}")]
    Tokenizer {
        path: PathBuf,
        source: tokenizers::Error,
    },
    #[error("no tokenizer.json or vocab.txt found in {0}")]
    MissingTokenizer(PathBuf),
    #[error("no model.safetensors or pytorch_model.bin found in {0}")]
    MissingWeights(PathBuf),
    #[error("failed to load model weights from {path}: {source}")]
    Weights {
        path: PathBuf,
        source: candle_core::Error,
    },
    #[error(
        "max_length {max_length} exceeds the model's max_position_embeddings {max_positions}"
    )]
    MaxLength {
        max_length: usize,
        max_positions: usize,
    },
    #[error("failed to build classifier: {0}")]
    Model(candle_core::Error),
    #[error("failed to initialise compute device: {0}")]
    Device(candle_core::Error),
}

/// Per-request failure. Converted into a 500 at the HTTP boundary; the
/// service keeps serving afterwards.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("encoding failed: {0}")]
    Encode(tokenizers::Error),
    #[error("inference failed: {0}")]
    Inference(#[from] candle_core::Error),
    #[error("model returned no logits")]
    EmptyLogits,
    #[error("inference worker failed: {0}")]
    Worker(String),
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
pub type PredictResult<T> = std::result::Result<T, PredictError>;
