//! Fixtures for a tiny randomly-initialised BERT checkpoint.

use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};

use crate::model::{BertForSequenceClassification, Config};

pub const TINY_BERT: &str = r#"{
    "architectures": ["BertForSequenceClassification"],
    "model_type": "bert",
    "vocab_size": 32,
    "hidden_size": 8,
    "num_hidden_layers": 1,
    "num_attention_heads": 2,
    "intermediate_size": 16,
    "hidden_act": "gelu",
    "hidden_dropout_prob": 0.1,
    "attention_probs_dropout_prob": 0.1,
    "max_position_embeddings": 64,
    "type_vocab_size": 2,
    "initializer_range": 0.02,
    "layer_norm_eps": 1e-12,
    "pad_token_id": 0,
    "position_embedding_type": "absolute",
    "use_cache": true,
    "classifier_dropout": null
}"#;

const VOCAB: &[&str] = &[
    "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "great", "product", "terrible", "the", "was",
    "it", "i", "love", "this", "##s", "##ing", "not", "bad", "good", "very", "a", "and", "to",
    "of", "is", "in", "for", "on", "with", "but", "!", ".",
];

pub fn tiny_config() -> Config {
    serde_json::from_str(TINY_BERT).expect("fixture config parses")
}

pub fn write_vocab(dir: &Path) {
    std::fs::write(dir.join("vocab.txt"), VOCAB.join("\n")).expect("write vocab.txt");
}

/// Writes `config.json`, `vocab.txt` and `model.safetensors` into `dir`.
pub fn write_checkpoint(dir: &Path) {
    std::fs::write(dir.join("config.json"), TINY_BERT).expect("write config.json");
    write_vocab(dir);

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    BertForSequenceClassification::load(vb, &tiny_config()).expect("init tiny bert");
    varmap
        .save(dir.join("model.safetensors"))
        .expect("write model.safetensors");
}
