//! Viola-Jones Haar cascade evaluation.
//!
//! A cascade is a list of stages, each a sum of decision stumps over upright
//! Haar-like rectangle features.  A window is accepted only if every stage
//! sum reaches the stage threshold.  Feature responses are normalised by the
//! window's standard deviation, so a single cascade works across lighting
//! conditions.
//!
//! Cascades are stored as JSON:
//!
//! ```json
//! { "width": 24, "height": 24,
//!   "stages": [ { "threshold": -0.82,
//!                 "classifiers": [ { "threshold": 0.004, "left": 0.03, "right": -0.8,
//!                                    "rects": [[6, 4, 12, 9, -1.0], [6, 7, 12, 3, 3.0]] } ] } ] }
//! ```

use std::path::Path;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::detect::grouping::group_rectangles;
use crate::detect::rect::Rect;
use crate::detect::ObjectDetector;
use crate::error::{ClassifierError, Result};
use crate::imaging::resize_bilinear;

/// Subtracted from every stage threshold on load to absorb float noise in
/// thresholds that were trained exactly at a sample's score.
const STAGE_THRESHOLD_EPS: f32 = 1e-5;

/// Similarity tolerance used when merging overlapping detections.
const GROUP_EPS: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HaarCascade {
    /// Base detection window size in pixels.
    pub width: u32,
    pub height: u32,
    pub stages: Vec<CascadeStage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeStage {
    pub threshold: f32,
    pub classifiers: Vec<Stump>,
}

/// Depth-one decision tree over a single Haar feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stump {
    pub threshold: f32,
    /// Vote when the normalised feature response is below `threshold`.
    pub left: f32,
    pub right: f32,
    /// `[x, y, width, height, weight]` relative to the base window.
    pub rects: Vec<[f32; 5]>,
}

impl HaarCascade {
    /// Loads a cascade from a JSON file and validates it.
    pub fn load_json(path: impl AsRef<Path>) -> Result<HaarCascade> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let mut cascade: HaarCascade = serde_json::from_reader(reader)?;
        cascade
            .validate()
            .map_err(|reason| ClassifierError::artifact(path.display().to_string(), reason))?;
        for stage in &mut cascade.stages {
            stage.threshold -= STAGE_THRESHOLD_EPS;
        }
        Ok(cascade)
    }

    /// Checks that the cascade is non-empty and every feature rectangle lies
    /// inside the base window.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.width < 3 || self.height < 3 {
            return Err(format!("window {}x{} is too small", self.width, self.height));
        }
        if self.stages.is_empty() {
            return Err("cascade has no stages".into());
        }
        for (si, stage) in self.stages.iter().enumerate() {
            if stage.classifiers.is_empty() {
                return Err(format!("stage {} has no classifiers", si));
            }
            for stump in &stage.classifiers {
                if stump.rects.is_empty() {
                    return Err(format!("stage {} has a feature without rectangles", si));
                }
                for r in &stump.rects {
                    let [x, y, w, h, _] = *r;
                    if x < 0.0 || y < 0.0 || w <= 0.0 || h <= 0.0
                        || x + w > self.width as f32
                        || y + h > self.height as f32
                    {
                        return Err(format!("stage {} rectangle {:?} leaves the window", si, r));
                    }
                }
            }
        }
        Ok(())
    }

    /// Evaluates the cascade on the window whose top-left corner is `(x, y)`
    /// in the integral images.
    fn accepts(&self, ii: &IntegralImages, x: usize, y: usize) -> bool {
        let w = self.width as usize;
        let h = self.height as usize;

        // Normalisation uses the window shrunk by one pixel on every side.
        let area = ((w - 2) * (h - 2)) as f64;
        let sum = ii.sum(x + 1, y + 1, w - 2, h - 2) as f64;
        let sq = ii.sq_sum(x + 1, y + 1, w - 2, h - 2) as f64;
        let var = area * sq - sum * sum;
        let norm = if var > 0.0 { var.sqrt() } else { 1.0 };

        for stage in &self.stages {
            let mut stage_sum = 0.0f32;
            for stump in &stage.classifiers {
                let mut value = 0.0f64;
                for r in &stump.rects {
                    let rs = ii.sum(
                        x + r[0] as usize,
                        y + r[1] as usize,
                        r[2] as usize,
                        r[3] as usize,
                    );
                    value += rs as f64 * r[4] as f64;
                }
                stage_sum += if value < stump.threshold as f64 * norm { stump.left } else { stump.right };
            }
            if stage_sum < stage.threshold {
                return false;
            }
        }
        true
    }
}

/// Summed-area tables for pixel values and squared pixel values.
struct IntegralImages {
    stride: usize,
    sum: Vec<u64>,
    sq: Vec<u64>,
}

impl IntegralImages {
    fn new(img: &GrayImage) -> IntegralImages {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0u64; stride * (h + 1)];
        let mut sq = vec![0u64; stride * (h + 1)];
        let raw = img.as_raw();

        for y in 0..h {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let v = raw[y * w + x] as u64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + (x + 1);
                sum[idx] = sum[idx - stride] + row_sum;
                sq[idx] = sq[idx - stride] + row_sq;
            }
        }
        IntegralImages { stride, sum, sq }
    }

    #[inline]
    fn rect(table: &[u64], stride: usize, x: usize, y: usize, w: usize, h: usize) -> u64 {
        let (x1, y1) = (x + w, y + h);
        table[y1 * stride + x1] + table[y * stride + x] - table[y1 * stride + x] - table[y * stride + x1]
    }

    fn sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        Self::rect(&self.sum, self.stride, x, y, w, h)
    }

    fn sq_sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        Self::rect(&self.sq, self.stride, x, y, w, h)
    }
}

/// Multi-scale search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Ratio between successive pyramid scales; must be > 1.
    pub scale_factor: f64,
    /// Raw hits a group needs (strictly more than this) to be reported.
    /// Zero disables grouping and returns every raw hit.
    pub min_neighbors: usize,
    /// Smallest reported object size, `(0, 0)` for no limit.
    pub min_size: (u32, u32),
}

impl Default for DetectionParams {
    fn default() -> Self {
        DetectionParams { scale_factor: 1.1, min_neighbors: 3, min_size: (0, 0) }
    }
}

/// An [`ObjectDetector`] running a Haar cascade over an image pyramid.
pub struct CascadeDetector {
    cascade: HaarCascade,
    params: DetectionParams,
}

impl CascadeDetector {
    pub fn new(cascade: HaarCascade, params: DetectionParams) -> Result<CascadeDetector> {
        if !(params.scale_factor > 1.0) {
            return Err(ClassifierError::artifact(
                "detection parameters",
                format!("scale factor must be > 1, got {}", params.scale_factor),
            ));
        }
        Ok(CascadeDetector { cascade, params })
    }

    /// Pyramid scale factors worth scanning for an image of `size`.
    fn scales(&self, size: (u32, u32)) -> Vec<f64> {
        let (img_w, img_h) = (size.0 as f64, size.1 as f64);
        let (cw, ch) = (self.cascade.width as f64, self.cascade.height as f64);
        let mut scales = Vec::new();
        let mut factor = 1.0f64;
        loop {
            let win_w = (cw * factor).round();
            let win_h = (ch * factor).round();
            if win_w > img_w || win_h > img_h {
                break;
            }
            let scaled_w = (img_w / factor).round();
            let scaled_h = (img_h / factor).round();
            if scaled_w < cw || scaled_h < ch {
                break;
            }
            if win_w >= self.params.min_size.0 as f64 && win_h >= self.params.min_size.1 as f64 {
                scales.push(factor);
            }
            factor *= self.params.scale_factor;
        }
        scales
    }

    /// Every window position that passes the cascade, in source coordinates.
    pub fn raw_hits(&self, gray: &GrayImage) -> Vec<Rect> {
        let cw = self.cascade.width as usize;
        let ch = self.cascade.height as usize;
        let mut hits = Vec::new();

        for factor in self.scales(gray.dimensions()) {
            let sw = (gray.width() as f64 / factor).round() as u32;
            let sh = (gray.height() as f64 / factor).round() as u32;
            let scaled = match resize_bilinear(gray, sw, sh) {
                Some(img) => img,
                None => continue,
            };
            let ii = IntegralImages::new(&scaled);
            let step = if factor > 2.0 { 1 } else { 2 };
            let win_w = (cw as f64 * factor).round() as i32;
            let win_h = (ch as f64 * factor).round() as i32;

            let max_y = sh as usize - ch;
            let max_x = sw as usize - cw;
            for y in (0..=max_y).step_by(step) {
                for x in (0..=max_x).step_by(step) {
                    if self.cascade.accepts(&ii, x, y) {
                        hits.push(Rect::new(
                            (x as f64 * factor).round() as i32,
                            (y as f64 * factor).round() as i32,
                            win_w,
                            win_h,
                        ));
                    }
                }
            }
        }
        hits
    }
}

impl ObjectDetector for CascadeDetector {
    fn detect(&self, gray: &GrayImage) -> Vec<Rect> {
        let hits = self.raw_hits(gray);
        group_rectangles(hits, self.params.min_neighbors, GROUP_EPS)
    }
}
