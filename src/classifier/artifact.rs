use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classifier::{Classifier, LogisticRegression};
use crate::error::{ClassifierError, Result};
use crate::network::Network;

/// Serialized classifier, tagged by backend:
///
/// ```json
/// { "kind": "network", "layers": [ ... ], "metadata": { ... } }
/// { "kind": "logistic_regression", "coef": { ... }, "intercept": [ ... ], "classes": [1, 2, 3] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Network(Network),
    LogisticRegression(LogisticRegression),
}

impl ModelArtifact {
    /// Reads and validates a model file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<ModelArtifact> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        artifact
            .validate()
            .map_err(|reason| ClassifierError::artifact(path.display().to_string(), reason))?;
        Ok(artifact)
    }

    /// Writes the model as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            ModelArtifact::Network(n) => n.validate(),
            ModelArtifact::LogisticRegression(m) => m.validate(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Network(_) => "network",
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
        }
    }

    pub fn into_classifier(self) -> Arc<dyn Classifier> {
        match self {
            ModelArtifact::Network(n) => Arc::new(n),
            ModelArtifact::LogisticRegression(m) => Arc::new(m),
        }
    }
}
