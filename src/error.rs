use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Could not convert b64 string to image: {0}")]
    Decode(String),

    #[error("Feature extraction failed: {0}")]
    FeatureExtraction(String),

    #[error("Model artifacts are not loaded")]
    ModelNotLoaded,

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Invalid artifact '{path}': {reason}")]
    Artifact { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClassifierError {
    pub fn artifact(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ClassifierError::Artifact { path: path.into(), reason: reason.into() }
    }

    /// True for errors that abort a whole request because of bad client input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ClassifierError::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
