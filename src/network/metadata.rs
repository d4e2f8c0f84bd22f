use serde::{Deserialize, Serialize};

use crate::features::FeatureLayout;

/// Optional annotations attached to a saved model.
/// All fields are Option<> so models exported without metadata deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelMetadata {
    pub description: Option<String>,
    /// Feature layout the model was trained on; defaults apply when absent.
    pub feature_layout: Option<FeatureLayout>,
}

impl ModelMetadata {
    pub fn layout(&self) -> FeatureLayout {
        self.feature_layout.clone().unwrap_or_default()
    }
}
