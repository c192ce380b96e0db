use candle_core::{IndexOp, Module, Result, Tensor};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::BertModel;

use super::config::Config;

/// BERT encoder with the pooler and linear head of Hugging Face's
/// `BertForSequenceClassification`. Dropout is omitted: this type only
/// ever runs in inference mode.
pub struct BertForSequenceClassification {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    num_labels: usize,
}

impl BertForSequenceClassification {
    pub fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let hidden_size = config.bert_config.hidden_size;
        let num_labels = config.num_labels();
        let bert = BertModel::load(vb.pp("bert"), &config.bert_config)?;
        let pooler = candle_nn::linear(hidden_size, hidden_size, vb.pp("bert.pooler.dense"))?;
        let classifier = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))?;
        Ok(Self {
            bert,
            pooler,
            classifier,
            num_labels,
        })
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Returns `(batch, num_labels)` logits.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        // [CLS] is always position 0
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        self.classifier.forward(&pooled)
    }
}
