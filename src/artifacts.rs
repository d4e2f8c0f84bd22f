//! Loading of the on-disk artifacts and the one-time initialization gate.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{error, info};

use crate::classifier::ModelArtifact;
use crate::detect::{CascadeDetector, DetectionParams, HaarCascade, TwoEyeFaceDetector};
use crate::dictionary::ClassDictionary;
use crate::error::{ClassifierError, Result};
use crate::pipeline::PipelineContext;

/// Where each artifact lives.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub class_dictionary: PathBuf,
    /// Optional; checked against the forward map when present.
    pub class_dictionary_reverse: PathBuf,
    pub model: PathBuf,
    pub face_cascade: PathBuf,
    pub eye_cascade: PathBuf,
}

/// Reads every artifact and builds a ready-to-use context.
pub fn load_context(
    paths: &ArtifactPaths,
    face_params: DetectionParams,
    eye_params: DetectionParams,
) -> Result<PipelineContext> {
    let reverse = paths.class_dictionary_reverse.as_path();
    let reverse = if reverse.exists() { Some(reverse) } else { None };
    let dictionary = ClassDictionary::load(&paths.class_dictionary, reverse)
        .map_err(|e| with_path(e, &paths.class_dictionary))?;
    info!(classes = dictionary.len(), path = %paths.class_dictionary.display(), "class dictionary loaded");

    let model = ModelArtifact::load_json(&paths.model).map_err(|e| with_path(e, &paths.model))?;
    info!(kind = model.kind(), path = %paths.model.display(), "model loaded");

    let faces = HaarCascade::load_json(&paths.face_cascade).map_err(|e| with_path(e, &paths.face_cascade))?;
    let eyes = HaarCascade::load_json(&paths.eye_cascade).map_err(|e| with_path(e, &paths.eye_cascade))?;
    let detector = TwoEyeFaceDetector::new(
        Box::new(CascadeDetector::new(faces, face_params)?),
        Box::new(CascadeDetector::new(eyes, eye_params)?),
    );
    info!("cascades loaded");

    PipelineContext::new(Arc::new(detector), model.into_classifier(), dictionary)
}

/// Attaches the file name to errors that do not carry one.
fn with_path(err: ClassifierError, path: &std::path::Path) -> ClassifierError {
    match err {
        ClassifierError::Io(e) => ClassifierError::artifact(path.display().to_string(), e.to_string()),
        ClassifierError::Json(e) => ClassifierError::artifact(path.display().to_string(), e.to_string()),
        other => other,
    }
}

type Loader = Box<dyn Fn() -> Result<PipelineContext> + Send + Sync>;

/// Holds the shared context and loads it at most once.
///
/// Concurrent callers that find it missing serialize on a mutex; the first
/// one loads and the rest reuse its result.  A failed load leaves the store
/// empty so a later call can try again.
pub struct ArtifactStore {
    loader: Loader,
    context: OnceLock<Arc<PipelineContext>>,
    gate: Mutex<()>,
}

impl ArtifactStore {
    pub fn new(paths: ArtifactPaths, face_params: DetectionParams, eye_params: DetectionParams) -> ArtifactStore {
        ArtifactStore::with_loader(move || load_context(&paths, face_params, eye_params))
    }

    pub fn with_loader<F>(loader: F) -> ArtifactStore
    where
        F: Fn() -> Result<PipelineContext> + Send + Sync + 'static,
    {
        ArtifactStore { loader: Box::new(loader), context: OnceLock::new(), gate: Mutex::new(()) }
    }

    pub fn is_loaded(&self) -> bool {
        self.context.get().is_some()
    }

    /// Returns the context, loading it first if needed.
    pub fn load(&self) -> Result<Arc<PipelineContext>> {
        if let Some(ctx) = self.context.get() {
            return Ok(ctx.clone());
        }
        let _guard = self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(ctx) = self.context.get() {
            return Ok(ctx.clone());
        }
        let ctx = Arc::new((self.loader)()?);
        let _ = self.context.set(ctx.clone());
        Ok(ctx)
    }

    /// Like [`load`](Self::load) but reports any failure as `ModelNotLoaded`.
    pub fn require(&self) -> Result<Arc<PipelineContext>> {
        self.load().map_err(|e| {
            error!(error = %e, "artifacts unavailable");
            ClassifierError::ModelNotLoaded
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;
    use crate::detect::{FaceCrop, FaceDetector};
    use image::RgbImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoFaces;

    impl FaceDetector for NoFaces {
        fn detect_faces(&self, _img: &RgbImage) -> Vec<FaceCrop> {
            Vec::new()
        }
    }

    struct Uniform;

    impl Classifier for Uniform {
        fn input_size(&self) -> usize {
            4096
        }

        fn class_count(&self) -> usize {
            1
        }

        fn predict_probabilities(&self, _features: &[f64]) -> Result<Vec<f64>> {
            Ok(vec![1.0])
        }
    }

    fn tiny_context() -> Result<PipelineContext> {
        let dict = ClassDictionary::from_pairs([("only", 1)])?;
        PipelineContext::new(Arc::new(NoFaces), Arc::new(Uniform), dict)
    }

    #[test]
    fn concurrent_callers_load_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let store = Arc::new(ArtifactStore::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            tiny_context()
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.load().is_ok())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(store.is_loaded());
    }

    #[test]
    fn failed_load_can_be_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let store = ArtifactStore::with_loader(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ClassifierError::artifact("model.json", "missing"))
            } else {
                tiny_context()
            }
        });

        assert!(matches!(store.require(), Err(ClassifierError::ModelNotLoaded)));
        assert!(!store.is_loaded());
        assert!(store.require().is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_files_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths {
            class_dictionary: dir.path().join("class_dictionary.json"),
            class_dictionary_reverse: dir.path().join("class_dictionary_reverse.json"),
            model: dir.path().join("model.json"),
            face_cascade: dir.path().join("face.json"),
            eye_cascade: dir.path().join("eye.json"),
        };
        match load_context(&paths, DetectionParams::default(), DetectionParams::default()) {
            Err(ClassifierError::Artifact { path, .. }) => assert!(path.ends_with("class_dictionary.json")),
            other => panic!("expected an artifact error, got {:?}", other.err()),
        }
    }
}
