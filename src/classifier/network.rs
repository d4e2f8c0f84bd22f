use crate::classifier::{check_input, check_output, Classifier};
use crate::error::Result;
use crate::features::FeatureLayout;
use crate::network::Network;

impl Classifier for Network {
    fn input_size(&self) -> usize {
        Network::input_size(self)
    }

    fn class_count(&self) -> usize {
        self.output_size()
    }

    fn feature_layout(&self) -> FeatureLayout {
        self.metadata.as_ref().map(|m| m.layout()).unwrap_or_default()
    }

    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_input(features, Network::input_size(self))?;
        check_output(self.forward(features))
    }
}
