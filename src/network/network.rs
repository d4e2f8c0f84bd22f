use crate::{activation::activation::ActivationFunction, layers::dense::Layer};
use crate::network::metadata::ModelMetadata;
use serde::{Serialize, Deserialize};

/// Feed-forward classifier: dense layers ending in a softmax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Network {
        Network { layers, metadata: None }
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size())
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    /// Checks layer shapes chain together and the output is a softmax.
    pub fn validate(&self) -> Result<(), String> {
        let last = self.layers.last().ok_or("network has no layers")?;
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate().map_err(|e| format!("layer {}: {}", i, e))?;
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].size != pair[1].input_size() {
                return Err(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i, pair[0].size, i + 1, pair[1].input_size()
                ));
            }
        }
        if last.activator != ActivationFunction::Softmax {
            return Err(format!("output activation must be Softmax, found {:?}", last.activator));
        }
        Ok(())
    }

    /// Forward pass.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.forward(&current);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;

    fn two_layer() -> Network {
        Network::new(vec![
            Layer::from_parts(Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]), vec![0.0, 0.0], ActivationFunction::ReLU),
            Layer::from_parts(Matrix::from_data(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]), vec![0.0, 0.0, 0.0], ActivationFunction::Softmax),
        ])
    }

    #[test]
    fn valid_network_produces_a_distribution() {
        let net = two_layer();
        assert!(net.validate().is_ok());
        assert_eq!((net.input_size(), net.output_size()), (2, 3));
        let p = net.forward(&[2.0, 0.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[0] > p[1] && (p[1] - p[2]).abs() < 1e-12);
    }

    #[test]
    fn non_softmax_output_is_rejected() {
        let mut net = two_layer();
        net.layers[1].activator = ActivationFunction::Sigmoid;
        assert!(net.validate().is_err());
    }

    #[test]
    fn broken_chain_is_rejected() {
        let mut net = two_layer();
        net.layers[1] = Layer::from_parts(Matrix::zeros(5, 3), vec![0.0; 3], ActivationFunction::Softmax);
        assert!(net.validate().unwrap_err().contains("layer 1 expects 5"));
    }
}
