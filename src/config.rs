//! Service configuration.

use std::path::PathBuf;
use std::str::FromStr;

use crate::artifacts::ArtifactPaths;
use crate::detect::DetectionParams;

/// Classification service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Directory holding the dictionary, model and cascades
    pub artifacts_dir: PathBuf,
    /// Model file name inside `artifacts_dir`
    pub model_file: String,
    /// Face cascade file name inside `artifacts_dir`
    pub face_cascade: String,
    /// Eye cascade file name inside `artifacts_dir`
    pub eye_cascade: String,
    /// Defer artifact loading to the first classification request
    pub lazy_load: bool,
    /// Max request body size
    pub max_body_bytes: usize,
    /// Face search over the whole grayscale image
    pub face_detection: DetectionParams,
    /// Eye search inside each face region
    pub eye_detection: DetectionParams,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            artifacts_dir: PathBuf::from("server/artifacts"),
            model_file: "model.json".to_string(),
            face_cascade: "haarcascade_frontalface_default.json".to_string(),
            eye_cascade: "haarcascade_eye.json".to_string(),
            lazy_load: false,
            max_body_bytes: 10 * 1024 * 1024, // 10MB
            face_detection: DetectionParams { scale_factor: 1.3, min_neighbors: 5, min_size: (0, 0) },
            eye_detection: DetectionParams { scale_factor: 1.1, min_neighbors: 3, min_size: (0, 0) },
        }
    }
}

impl ServiceConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key/value source; unset or unparsable
    /// values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let text = |key: &str| lookup(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        Self {
            host: text("CLASSIFIER_HOST").unwrap_or(d.host),
            port: parse_or(&lookup, "CLASSIFIER_PORT", d.port),
            artifacts_dir: text("CLASSIFIER_ARTIFACTS_DIR").map(PathBuf::from).unwrap_or(d.artifacts_dir),
            model_file: text("CLASSIFIER_MODEL_FILE").unwrap_or(d.model_file),
            face_cascade: text("CLASSIFIER_FACE_CASCADE").unwrap_or(d.face_cascade),
            eye_cascade: text("CLASSIFIER_EYE_CASCADE").unwrap_or(d.eye_cascade),
            lazy_load: lookup("CLASSIFIER_LAZY_LOAD")
                .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(d.lazy_load),
            max_body_bytes: parse_or(&lookup, "CLASSIFIER_MAX_BODY_BYTES", d.max_body_bytes),
            face_detection: DetectionParams {
                scale_factor: parse_or(&lookup, "CLASSIFIER_FACE_SCALE_FACTOR", d.face_detection.scale_factor),
                min_neighbors: parse_or(&lookup, "CLASSIFIER_FACE_MIN_NEIGHBORS", d.face_detection.min_neighbors),
                ..d.face_detection
            },
            eye_detection: DetectionParams {
                scale_factor: parse_or(&lookup, "CLASSIFIER_EYE_SCALE_FACTOR", d.eye_detection.scale_factor),
                min_neighbors: parse_or(&lookup, "CLASSIFIER_EYE_MIN_NEIGHBORS", d.eye_detection.min_neighbors),
                ..d.eye_detection
            },
        }
    }

    /// Address for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolved artifact file locations.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let dir = &self.artifacts_dir;
        ArtifactPaths {
            class_dictionary: dir.join("class_dictionary.json"),
            class_dictionary_reverse: dir.join("class_dictionary_reverse.json"),
            model: dir.join(&self.model_file),
            face_cascade: dir.join(&self.face_cascade),
            eye_cascade: dir.join(&self.eye_cascade),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key).and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}
