pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod imaging;
pub mod decode;
pub mod detect;
pub mod wavelet;
pub mod features;
pub mod classifier;
pub mod dictionary;
pub mod result;
pub mod pipeline;
pub mod artifacts;
pub mod config;
pub mod logging;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::network::Network;
pub use classifier::{Classifier, ModelArtifact, Prediction};
pub use detect::{FaceDetector, ObjectDetector};
pub use dictionary::ClassDictionary;
pub use result::{ClassificationResponse, FaceOutcome, FaceResult};
pub use pipeline::{classify_decoded, classify_image, PipelineContext};
pub use artifacts::{ArtifactPaths, ArtifactStore};
pub use config::ServiceConfig;
pub use error::{ClassifierError, Result};
