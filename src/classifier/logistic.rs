use serde::{Deserialize, Serialize};

use crate::activation::activation::softmax;
use crate::classifier::{argmax, check_input, check_output, Classifier};
use crate::error::Result;
use crate::features::FeatureLayout;
use crate::math::matrix::Matrix;
use crate::network::ModelMetadata;

/// Per-feature standardisation applied before the linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(v, (m, s))| {
                // Constant training features are stored with zero scale.
                let s = if *s == 0.0 { 1.0 } else { *s };
                (v - m) / s
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiClass {
    /// Softmax over all class scores.
    #[default]
    Multinomial,
    /// Independent sigmoid per class, renormalised to sum to one.
    Ovr,
}

/// Linear model over (optionally standardised) features.
///
/// `coef` has one row per class (or a single row for a two-class model,
/// whose score is the log-odds of class 2).  `classes` lists the class ids
/// in probability order and must be `1..=n`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Matrix,
    pub intercept: Vec<f64>,
    pub classes: Vec<u32>,
    #[serde(default)]
    pub multi_class: MultiClass,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl LogisticRegression {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.coef.is_consistent() || self.coef.rows == 0 || self.coef.cols == 0 {
            return Err("coef must be a non-empty rectangular matrix".into());
        }
        if self.intercept.len() != self.coef.rows {
            return Err(format!("{} intercepts for {} coefficient rows", self.intercept.len(), self.coef.rows));
        }
        let binary = self.coef.rows == 1 && self.classes.len() == 2;
        if !binary && self.coef.rows != self.classes.len() {
            return Err(format!("{} coefficient rows for {} classes", self.coef.rows, self.classes.len()));
        }
        if self.classes.iter().enumerate().any(|(i, &c)| c != i as u32 + 1) {
            return Err(format!("classes must be 1..={}, found {:?}", self.classes.len(), self.classes));
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != self.coef.cols || scaler.scale.len() != self.coef.cols {
                return Err("scaler length does not match the feature count".into());
            }
        }
        Ok(())
    }

    fn decision(&self, features: &[f64]) -> Vec<f64> {
        let scaled;
        let x = match &self.scaler {
            Some(s) => {
                scaled = s.transform(features);
                &scaled[..]
            }
            None => features,
        };
        self.coef
            .right_mul(x)
            .into_iter()
            .zip(self.intercept.iter())
            .map(|(v, b)| v + b)
            .collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for LogisticRegression {
    fn input_size(&self) -> usize {
        self.coef.cols
    }

    fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn feature_layout(&self) -> FeatureLayout {
        self.metadata.as_ref().map(|m| m.layout()).unwrap_or_default()
    }

    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_input(features, self.coef.cols)?;
        let scores = self.decision(features);

        let probabilities = if scores.len() == 1 {
            let p = sigmoid(scores[0]);
            vec![1.0 - p, p]
        } else {
            match self.multi_class {
                MultiClass::Multinomial => softmax(&scores),
                MultiClass::Ovr => {
                    let raw: Vec<f64> = scores.iter().map(|&s| sigmoid(s)).collect();
                    let total: f64 = raw.iter().sum();
                    raw.into_iter().map(|p| p / total).collect()
                }
            }
        };
        check_output(probabilities)
    }

    /// Highest decision score, which is also the highest probability.
    fn predict(&self, features: &[f64]) -> Result<u32> {
        check_input(features, self.coef.cols)?;
        let scores = self.decision(features);
        let idx = if scores.len() == 1 { usize::from(scores[0] > 0.0) } else { argmax(&scores) };
        Ok(self.classes[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_class() -> LogisticRegression {
        LogisticRegression {
            coef: Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]]),
            intercept: vec![0.0, 0.0, 0.0],
            classes: vec![1, 2, 3],
            multi_class: MultiClass::Multinomial,
            scaler: None,
            metadata: None,
        }
    }

    #[test]
    fn multinomial_probabilities_follow_scores() {
        let model = three_class();
        assert!(model.validate().is_ok());
        let p = model.predict_probabilities(&[0.0, 3.0]).unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&[0.0, 3.0]).unwrap(), 2);
        assert_eq!(argmax(&p), 1);
    }

    #[test]
    fn ovr_probabilities_are_renormalised() {
        let model = LogisticRegression { multi_class: MultiClass::Ovr, ..three_class() };
        let p = model.predict_probabilities(&[2.0, -1.0]).unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&[2.0, -1.0]).unwrap(), 1);
    }

    #[test]
    fn binary_model_uses_one_row() {
        let model = LogisticRegression {
            coef: Matrix::from_data(vec![vec![2.0]]),
            intercept: vec![0.0],
            classes: vec![1, 2],
            multi_class: MultiClass::Multinomial,
            scaler: None,
            metadata: None,
        };
        assert!(model.validate().is_ok());
        let p = model.predict_probabilities(&[1.0]).unwrap();
        assert!(p[1] > p[0]);
        assert_eq!(model.predict(&[1.0]).unwrap(), 2);
        assert_eq!(model.predict(&[-1.0]).unwrap(), 1);
    }

    #[test]
    fn scaler_is_applied_before_scoring() {
        let model = LogisticRegression {
            scaler: Some(StandardScaler { mean: vec![10.0, 0.0], scale: vec![2.0, 0.0] }),
            ..three_class()
        };
        assert!(model.validate().is_ok());
        // (10 - 10) / 2 = 0 and a zero scale is treated as one.
        assert_eq!(model.predict(&[10.0, 4.0]).unwrap(), 2);
    }

    #[test]
    fn class_ids_must_be_one_based() {
        let model = LogisticRegression { classes: vec![0, 1, 2], ..three_class() };
        assert!(model.validate().is_err());
    }
}
