#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{GrayImage, ImageOutputFormat, RgbImage};
use serde_json::json;

use face_classifier::detect::{ObjectDetector, Rect};
use face_classifier::{Classifier, Result};

pub fn png_base64(img: &RgbImage) -> String {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
    STANDARD.encode(buf.into_inner())
}

/// Object detector returning fixed rectangles and counting its calls.
pub struct FixedRects {
    pub rects: Vec<Rect>,
    pub calls: Arc<AtomicUsize>,
}

impl FixedRects {
    pub fn new(rects: Vec<Rect>) -> (FixedRects, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (FixedRects { rects, calls: calls.clone() }, calls)
    }
}

impl ObjectDetector for FixedRects {
    fn detect(&self, _gray: &GrayImage) -> Vec<Rect> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rects.clone()
    }
}

/// Reports two eyes inside bright regions and none inside dark ones.
pub struct BrightEyes;

impl ObjectDetector for BrightEyes {
    fn detect(&self, gray: &GrayImage) -> Vec<Rect> {
        let n = gray.pixels().count().max(1) as u64;
        let mean = gray.pixels().map(|p| p.0[0] as u64).sum::<u64>() / n;
        if mean > 128 {
            vec![Rect::new(1, 1, 3, 3), Rect::new(8, 1, 3, 3)]
        } else {
            Vec::new()
        }
    }
}

/// Three-class classifier with a fixed skewed distribution that records the
/// length of every vector it sees.
pub struct Recording {
    pub seen: Mutex<Vec<usize>>,
}

impl Recording {
    pub fn new() -> Arc<Recording> {
        Arc::new(Recording { seen: Mutex::new(Vec::new()) })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Classifier for Recording {
    fn input_size(&self) -> usize {
        4096
    }

    fn class_count(&self) -> usize {
        3
    }

    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.seen.lock().unwrap().push(features.len());
        Ok(vec![0.123456, 0.654321, 0.222223])
    }
}

/// Writes a complete artifact directory: dictionary (both directions), a
/// logistic model favouring class 2, and cascades that accept every window.
pub fn write_artifacts(dir: &Path) {
    write_json(dir.join("class_dictionary.json"), &json!({ "ada": 1, "grace": 2 }));
    write_json(dir.join("class_dictionary_reverse.json"), &json!({ "1": "ada", "2": "grace" }));
    write_json(
        dir.join("model.json"),
        &json!({
            "kind": "logistic_regression",
            "coef": { "rows": 2, "cols": 4096, "data": vec![vec![0.0; 4096]; 2] },
            "intercept": [0.0, 1.0],
            "classes": [1, 2],
            "metadata": { "description": "constant test model" }
        }),
    );
    write_json(dir.join("haarcascade_frontalface_default.json"), &accept_all(24));
    write_json(dir.join("haarcascade_eye.json"), &accept_all(5));
}

/// A one-stage cascade whose only stump votes zero against a negative
/// threshold, so every window passes.
pub fn accept_all(side: u32) -> serde_json::Value {
    json!({
        "width": side,
        "height": side,
        "stages": [{
            "threshold": -1.0,
            "classifiers": [{ "threshold": 0.0, "left": 0.0, "right": 0.0, "rects": [[0, 0, side, side, 1.0]] }]
        }]
    })
}

pub fn write_json(path: impl AsRef<Path>, value: &serde_json::Value) {
    std::fs::write(path, serde_json::to_vec(value).unwrap()).unwrap();
}
