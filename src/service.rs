use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::classifier::SequenceClassifier;
use crate::error::{PredictError, PredictResult};
use crate::labels::{argmax, LabelMap};

pub const READY_MESSAGE: &str = "Model is ready to make predictions!";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Prediction {
    pub label: String,
    pub class_id: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Readiness {
    pub message: String,
}

/// Immutable per-process context: the loaded classifier plus the label map.
/// Built once before the listener is bound and shared by every request.
#[derive(Clone)]
pub struct InferenceService {
    classifier: Arc<dyn SequenceClassifier>,
    labels: LabelMap,
}

impl InferenceService {
    pub fn new(classifier: Arc<dyn SequenceClassifier>, labels: LabelMap) -> Self {
        let num_labels = classifier.num_labels();
        if labels.len() != num_labels {
            tracing::warn!(
                num_labels,
                mapped = labels.len(),
                "Label map size differs from classifier head; unmapped classes report Unknown"
            );
        }
        Self { classifier, labels }
    }

    /// Synchronous, CPU/GPU bound. Callers on an async runtime should run
    /// this on a blocking thread.
    pub fn predict(&self, text: &str) -> PredictResult<Prediction> {
        let started = Instant::now();
        let logits = self.classifier.logits(text)?;
        let class_id = argmax(&logits).ok_or(PredictError::EmptyLogits)?;
        let label = self.labels.get(class_id).to_string();
        tracing::debug!(
            class_id,
            %label,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prediction complete"
        );
        Ok(Prediction { label, class_id })
    }

    pub fn ready(&self) -> Readiness {
        Readiness {
            message: READY_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::labels::UNKNOWN_LABEL;

    /// Returns fixed logits, or fails with an inference error when `None`.
    pub(crate) struct FakeClassifier {
        pub logits: Option<Vec<f32>>,
    }

    impl SequenceClassifier for FakeClassifier {
        fn logits(&self, text: &str) -> PredictResult<Vec<f32>> {
            if text == "explode" {
                return Err(PredictError::Encode("unsupported input".into()));
            }
            self.logits.clone().ok_or_else(|| {
                PredictError::Inference(candle_core::Error::Msg("device lost".to_string()))
            })
        }

        fn num_labels(&self) -> usize {
            self.logits.as_ref().map_or(2, Vec::len)
        }
    }

    pub(crate) fn service_with(logits: Option<Vec<f32>>) -> InferenceService {
        InferenceService::new(Arc::new(FakeClassifier { logits }), LabelMap::default())
    }

    #[test]
    fn class_zero_is_cg() {
        let prediction = service_with(Some(vec![3.0, -1.0])).predict("text").unwrap();
        assert_eq!(
            prediction,
            Prediction {
                label: "CG".to_string(),
                class_id: 0
            }
        );
    }

    #[test]
    fn class_one_is_or() {
        let prediction = service_with(Some(vec![-1.0, 3.0])).predict("text").unwrap();
        assert_eq!(prediction.label, "OR");
        assert_eq!(prediction.class_id, 1);
    }

    #[test]
    fn unmapped_class_is_unknown() {
        let prediction = service_with(Some(vec![0.0, 0.1, 9.0]))
            .predict("text")
            .unwrap();
        assert_eq!(prediction.label, UNKNOWN_LABEL);
        assert_eq!(prediction.class_id, 2);
    }

    #[test]
    fn tie_resolves_to_first_class() {
        let prediction = service_with(Some(vec![0.5, 0.5])).predict("").unwrap();
        assert_eq!(prediction.class_id, 0);
        assert_eq!(prediction.label, "CG");
    }

    #[test]
    fn classifier_errors_propagate() {
        let service = service_with(None);
        let err = service.predict("text").unwrap_err();
        assert!(matches!(err, PredictError::Inference(_)));
        assert!(err.to_string().contains("device lost"));
    }

    #[test]
    fn encode_errors_propagate_and_service_recovers() {
        let service = service_with(Some(vec![0.0, 1.0]));
        assert!(matches!(
            service.predict("explode"),
            Err(PredictError::Encode(_))
        ));
        assert_eq!(service.predict("fine").unwrap().label, "OR");
    }

    #[test]
    fn empty_logits_are_an_error() {
        let err = service_with(Some(vec![])).predict("text").unwrap_err();
        assert!(matches!(err, PredictError::EmptyLogits));
    }

    #[test]
    fn ready_reports_fixed_message() {
        assert_eq!(service_with(None).ready().message, READY_MESSAGE);
    }
}
