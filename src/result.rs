use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::classifier::Prediction;
use crate::dictionary::ClassDictionary;
use crate::error::{ClassifierError, Result};

pub const NO_FACE_MESSAGE: &str = "No face with 2 eyes detected";

/// Rounds for presentation only; never feed the result back into ranking.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Class name → probability, serialized as a JSON object in class-id order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassProbabilities(pub Vec<(String, f64)>);

impl ClassProbabilities {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, p) in &self.0 {
            map.serialize_entry(name, p)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceResult {
    pub face_id: usize,
    pub predicted_class: String,
    pub confidence: f64,
    pub class_probabilities: ClassProbabilities,
}

/// Outcome for one face: a classification or the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FaceOutcome {
    Classified(FaceResult),
    Failed { face_id: usize, error: String },
}

impl FaceOutcome {
    pub fn failed(face_id: usize, err: &ClassifierError) -> FaceOutcome {
        FaceOutcome::Failed { face_id, error: format!("Error processing face: {}", err) }
    }

    pub fn face_id(&self) -> usize {
        match self {
            FaceOutcome::Classified(r) => r.face_id,
            FaceOutcome::Failed { face_id, .. } => *face_id,
        }
    }
}

/// Response body for one classified image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClassificationResponse {
    NoFace {
        error: String,
        #[serde(rename = "faces found")]
        faces_found: usize,
    },
    Single(FaceOutcome),
    Multiple { total_faces: usize, results: Vec<FaceOutcome> },
}

impl ClassificationResponse {
    pub fn no_face() -> ClassificationResponse {
        ClassificationResponse::NoFace { error: NO_FACE_MESSAGE.to_owned(), faces_found: 0 }
    }

    /// Exactly one face is returned unwrapped; several are wrapped with a count.
    pub fn aggregate(mut outcomes: Vec<FaceOutcome>) -> ClassificationResponse {
        match outcomes.len() {
            0 => ClassificationResponse::no_face(),
            1 => ClassificationResponse::Single(outcomes.remove(0)),
            n => ClassificationResponse::Multiple { total_faces: n, results: outcomes },
        }
    }

    /// Faces represented in the response.
    pub fn face_count(&self) -> usize {
        match self {
            ClassificationResponse::NoFace { .. } => 0,
            ClassificationResponse::Single(_) => 1,
            ClassificationResponse::Multiple { total_faces, .. } => *total_faces,
        }
    }
}

/// Turns a raw prediction into a named, rounded result.
///
/// Probability index `i` is class id `i + 1`.
pub fn format_face(face_id: usize, prediction: &Prediction, dict: &ClassDictionary) -> Result<FaceResult> {
    let predicted_class = dict
        .name_of(prediction.class_id)
        .ok_or_else(|| ClassifierError::Prediction(format!("unknown class id {}", prediction.class_id)))?
        .to_owned();

    let mut probabilities = Vec::with_capacity(prediction.probabilities.len());
    for (i, &p) in prediction.probabilities.iter().enumerate() {
        let id = i as u32 + 1;
        let name = dict
            .name_of(id)
            .ok_or_else(|| ClassifierError::Prediction(format!("no class name for id {}", id)))?;
        probabilities.push((name.to_owned(), round4(p)));
    }

    let max = prediction.probabilities.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Ok(FaceResult {
        face_id,
        predicted_class,
        confidence: round4(max),
        class_probabilities: ClassProbabilities(probabilities),
    })
}
