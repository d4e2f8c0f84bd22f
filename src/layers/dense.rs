use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Fully connected layer: `a = σ(x · W + b)`.
///
/// `weights` is `input_size × size`, `biases` is `1 × size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    pub fn from_parts(weights: Matrix, biases: Vec<f64>, activation: ActivationFunction) -> Layer {
        Layer {
            size: weights.cols,
            weights,
            biases: Matrix::from_data(vec![biases]),
            activator: activation,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// Checks that the serialized shapes agree with `size`.
    pub fn validate(&self) -> Result<(), String> {
        if !self.weights.is_consistent() || !self.biases.is_consistent() {
            return Err("ragged weight or bias matrix".into());
        }
        if self.weights.cols != self.size {
            return Err(format!("weights have {} columns for a layer of size {}", self.weights.cols, self.size));
        }
        if self.biases.rows != 1 || self.biases.cols != self.size {
            return Err(format!("biases are {}x{}, expected 1x{}", self.biases.rows, self.biases.cols, self.size));
        }
        Ok(())
    }

    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut z = self.weights.left_mul(input);
        for (v, b) in z.iter_mut().zip(self.biases.data[0].iter()) {
            *v += b;
        }
        self.activator.apply(&z)
    }
}
