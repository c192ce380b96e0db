pub mod api;
pub mod classifier;
pub mod config;
pub mod device;
pub mod error;
pub mod labels;
pub mod model;
pub mod service;
pub mod tokenizer;

#[cfg(test)]
mod testutil;

pub use classifier::{BertClassifier, SequenceClassifier};
pub use config::ServerConfig;
pub use error::{LoadError, PredictError};
pub use labels::LabelMap;
pub use service::{InferenceService, Prediction};
