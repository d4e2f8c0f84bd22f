//! Request-level orchestration: decode, detect, extract, classify, format.

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::decode::decode_base64_image;
use crate::detect::FaceDetector;
use crate::dictionary::ClassDictionary;
use crate::error::{ClassifierError, Result};
use crate::features::{assemble_features, FeatureLayout};
use crate::result::{format_face, ClassificationResponse, FaceOutcome, FaceResult};

/// Everything a request needs, loaded once and shared read-only.
pub struct PipelineContext {
    detector: Arc<dyn FaceDetector>,
    classifier: Arc<dyn Classifier>,
    dictionary: ClassDictionary,
    layout: FeatureLayout,
}

impl PipelineContext {
    /// Assembles a context, checking the parts agree with each other.
    pub fn new(
        detector: Arc<dyn FaceDetector>,
        classifier: Arc<dyn Classifier>,
        dictionary: ClassDictionary,
    ) -> Result<PipelineContext> {
        if dictionary.len() != classifier.class_count() {
            return Err(ClassifierError::artifact(
                "class dictionary",
                format!(
                    "{} classes in the dictionary but the model predicts {}",
                    dictionary.len(),
                    classifier.class_count()
                ),
            ));
        }
        if !dictionary.is_contiguous() {
            return Err(ClassifierError::artifact(
                "class dictionary",
                format!("class ids must be 1..={}", dictionary.len()),
            ));
        }
        let layout = classifier.feature_layout();
        if layout.len() != classifier.input_size() {
            return Err(ClassifierError::artifact(
                "model",
                format!(
                    "feature layout produces {} values but the model expects {}",
                    layout.len(),
                    classifier.input_size()
                ),
            ));
        }
        Ok(PipelineContext { detector, classifier, dictionary, layout })
    }

    pub fn dictionary(&self) -> &ClassDictionary {
        &self.dictionary
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

/// Classifies every qualifying face in a base64-encoded image.
///
/// Only decoding failures are returned as `Err`; a picture without a usable
/// face is a normal response, and a face that fails later is reported in its
/// own entry.
pub fn classify_image(ctx: &PipelineContext, image_base64: &str) -> Result<ClassificationResponse> {
    let img = decode_base64_image(image_base64)?;
    Ok(classify_decoded(ctx, &img))
}

/// Same as [`classify_image`] for an already decoded picture.
pub fn classify_decoded(ctx: &PipelineContext, img: &RgbImage) -> ClassificationResponse {
    let faces = ctx.detector.detect_faces(img);
    if faces.is_empty() {
        info!(width = img.width(), height = img.height(), "no face with two eyes found");
        return ClassificationResponse::no_face();
    }

    let outcomes: Vec<FaceOutcome> = faces
        .iter()
        .enumerate()
        .map(|(i, face)| {
            let face_id = i + 1;
            match classify_face(ctx, face_id, &face.image) {
                Ok(result) => {
                    debug!(
                        face_id,
                        class = %result.predicted_class,
                        confidence = result.confidence,
                        "face classified"
                    );
                    FaceOutcome::Classified(result)
                }
                Err(e) => {
                    warn!(face_id, error = %e, "face could not be classified");
                    FaceOutcome::failed(face_id, &e)
                }
            }
        })
        .collect();

    info!(faces = outcomes.len(), "image classified");
    ClassificationResponse::aggregate(outcomes)
}

/// Features, prediction and formatting for one cropped face.
pub fn classify_face(ctx: &PipelineContext, face_id: usize, crop: &RgbImage) -> Result<FaceResult> {
    let features = assemble_features(crop, &ctx.layout)?;
    let prediction = ctx.classifier.classify(&features)?;
    format_face(face_id, &prediction, &ctx.dictionary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{FaceCrop, Rect};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoFaces;

    impl FaceDetector for NoFaces {
        fn detect_faces(&self, _img: &RgbImage) -> Vec<FaceCrop> {
            Vec::new()
        }
    }

    struct WholeImage;

    impl FaceDetector for WholeImage {
        fn detect_faces(&self, img: &RgbImage) -> Vec<FaceCrop> {
            vec![FaceCrop { region: Rect::new(0, 0, img.width() as i32, img.height() as i32), image: img.clone() }]
        }
    }

    /// Favours class 2 and counts how often it is asked.
    struct Fixed {
        calls: AtomicUsize,
    }

    impl Classifier for Fixed {
        fn input_size(&self) -> usize {
            4096
        }

        fn class_count(&self) -> usize {
            2
        }

        fn predict_probabilities(&self, _features: &[f64]) -> Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.25, 0.75])
        }
    }

    fn context(detector: Arc<dyn FaceDetector>) -> (PipelineContext, Arc<Fixed>) {
        let classifier = Arc::new(Fixed { calls: AtomicUsize::new(0) });
        let dict = ClassDictionary::from_pairs([("ada", 1), ("grace", 2)]).unwrap();
        let ctx = PipelineContext::new(detector, classifier.clone(), dict).unwrap();
        (ctx, classifier)
    }

    #[test]
    fn no_face_skips_the_classifier() {
        let (ctx, classifier) = context(Arc::new(NoFaces));
        let response = classify_decoded(&ctx, &RgbImage::new(40, 40));
        assert_eq!(response, ClassificationResponse::no_face());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn single_face_is_flat() {
        let (ctx, classifier) = context(Arc::new(WholeImage));
        match classify_decoded(&ctx, &RgbImage::new(40, 30)) {
            ClassificationResponse::Single(FaceOutcome::Classified(r)) => {
                assert_eq!(r.face_id, 1);
                assert_eq!(r.predicted_class, "grace");
                assert_eq!(r.confidence, 0.75);
            }
            other => panic!("unexpected response {:?}", other),
        }
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_input_is_a_decode_error() {
        let (ctx, _) = context(Arc::new(WholeImage));
        assert!(matches!(classify_image(&ctx, ""), Err(ClassifierError::Decode(_))));
    }

    #[test]
    fn mismatched_dictionary_is_rejected() {
        let classifier = Arc::new(Fixed { calls: AtomicUsize::new(0) });
        let dict = ClassDictionary::from_pairs([("ada", 1), ("grace", 2), ("linus", 3)]).unwrap();
        assert!(PipelineContext::new(Arc::new(NoFaces), classifier, dict).is_err());
    }
}
