use serde::Deserialize;
use std::collections::BTreeMap;

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Class index to human-readable label. Indices without an entry resolve to
/// [`UNKNOWN_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<usize, String>);

impl LabelMap {
    pub fn new(entries: impl IntoIterator<Item = (usize, String)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, class_id: usize) -> &str {
        self.0
            .get(&class_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new([(0, "CG".to_string()), (1, "OR".to_string())])
    }
}

/// Index of the largest score; the first one wins on ties. NaN scores never
/// win, unlike `torch.argmax`, which returns the first NaN index. `None` when
/// no score is a number.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}
