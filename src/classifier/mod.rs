//! Classifier capability and the backends that can be loaded from disk.
//!
//! Probabilities are indexed by class position: index `i` is class id
//! `i + 1`.  Class id 0 is never produced.

pub mod artifact;
pub mod logistic;
pub mod network;

use crate::error::{ClassifierError, Result};
use crate::features::FeatureLayout;

pub use artifact::ModelArtifact;
pub use logistic::{LogisticRegression, MultiClass, StandardScaler};

/// Output of one classification: predicted id and the per-class distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_id: u32,
    pub probabilities: Vec<f64>,
}

pub trait Classifier: Send + Sync {
    /// Length of the feature vector the model accepts.
    fn input_size(&self) -> usize;

    fn class_count(&self) -> usize;

    /// Feature layout the model was trained on.
    fn feature_layout(&self) -> FeatureLayout {
        FeatureLayout::default()
    }

    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>>;

    fn predict(&self, features: &[f64]) -> Result<u32> {
        let probabilities = self.predict_probabilities(features)?;
        Ok(argmax(&probabilities) as u32 + 1)
    }

    fn classify(&self, features: &[f64]) -> Result<Prediction> {
        let probabilities = self.predict_probabilities(features)?;
        let class_id = argmax(&probabilities) as u32 + 1;
        Ok(Prediction { class_id, probabilities })
    }
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Rejects vectors of the wrong length before they reach a model.
pub(crate) fn check_input(features: &[f64], expected: usize) -> Result<()> {
    if features.len() != expected {
        return Err(ClassifierError::Prediction(format!(
            "model expects {} features, got {}",
            expected,
            features.len()
        )));
    }
    Ok(())
}

/// Rejects NaN or infinite model outputs.
pub(crate) fn check_output(probabilities: Vec<f64>) -> Result<Vec<f64>> {
    if probabilities.iter().any(|p| !p.is_finite()) {
        return Err(ClassifierError::Prediction("model produced non-finite probabilities".into()));
    }
    Ok(probabilities)
}
