use candle_transformers::models::bert::Config as BertConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::error::{LoadError, LoadResult};

const DEFAULT_NUM_LABELS: usize = 2;

/// `config.json` as written by `BertForSequenceClassification.save_pretrained`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub bert_config: BertConfig,
    #[serde(flatten)]
    pub classifier_config: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub num_labels: Option<usize>,
    #[serde(default)]
    pub id2label: HashMap<String, String>,
}

impl Config {
    pub fn from_file(path: &Path) -> LoadResult<Self> {
        let reader = File::open(path).map_err(|source| LoadError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(reader).map_err(|source| LoadError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Width of the classification head. An explicit `num_labels` wins,
    /// then the size of `id2label`, then the binary default.
    pub fn num_labels(&self) -> usize {
        let cc = &self.classifier_config;
        cc.num_labels
            .or_else(|| (!cc.id2label.is_empty()).then_some(cc.id2label.len()))
            .unwrap_or(DEFAULT_NUM_LABELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TINY_BERT;

    #[test]
    fn defaults_to_two_labels() {
        let config: Config = serde_json::from_str(TINY_BERT).unwrap();
        assert_eq!(config.bert_config.hidden_size, 8);
        assert_eq!(config.num_labels(), 2);
    }

    #[test]
    fn id2label_sets_head_width() {
        let mut value: serde_json::Value = serde_json::from_str(TINY_BERT).unwrap();
        value["id2label"] = serde_json::json!({"0": "a", "1": "b", "2": "c"});
        let config: Config = serde_json::from_value(value).unwrap();
        assert_eq!(config.num_labels(), 3);
    }

    #[test]
    fn explicit_num_labels_wins() {
        let mut value: serde_json::Value = serde_json::from_str(TINY_BERT).unwrap();
        value["id2label"] = serde_json::json!({"0": "a", "1": "b", "2": "c"});
        value["num_labels"] = serde_json::json!(4);
        let config: Config = serde_json::from_value(value).unwrap();
        assert_eq!(config.num_labels(), 4);
    }

    #[test]
    fn missing_file_is_config_io() {
        let err = Config::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, LoadError::ConfigIo { .. }));
    }

    #[test]
    fn garbage_is_config_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::ConfigParse { .. }));
    }
}
