use image::RgbImage;

use crate::error::{ClassifierError, Result};
use crate::features::layout::{ChannelOrder, FeatureLayout};
use crate::imaging::resize_bilinear;
use crate::wavelet::wavelet_detail_rgb;

/// Builds the classifier input for one cropped face.
///
/// The wavelet image is computed from the full-resolution crop and only
/// resized afterwards; resizing first would discard most of the texture the
/// detail bands are meant to capture.
pub fn assemble_features(face: &RgbImage, layout: &FeatureLayout) -> Result<Vec<f64>> {
    let (w, h) = face.dimensions();
    if w == 0 || h == 0 {
        return Err(ClassifierError::FeatureExtraction(format!("face crop is {}x{}", w, h)));
    }
    let side = layout.side;

    let raw = resize_bilinear(face, side, side)
        .ok_or_else(|| ClassifierError::FeatureExtraction(format!("cannot resize face crop to {}x{}", side, side)))?;
    let detail = wavelet_detail_rgb(face, &layout.wavelet)?;
    let detail = resize_bilinear(&detail, side, side)
        .ok_or_else(|| ClassifierError::FeatureExtraction("cannot resize wavelet image".into()))?;

    let mut features = Vec::with_capacity(layout.len());
    for px in raw.pixels() {
        let [r, g, b] = px.0;
        let ordered = match layout.channel_order {
            ChannelOrder::Bgr => [b, g, r],
            ChannelOrder::Rgb => [r, g, b],
        };
        features.extend(ordered.iter().map(|&c| c as f64));
    }
    features.extend(detail.pixels().map(|p| p.0[0] as f64));

    if features.len() != layout.len() {
        return Err(ClassifierError::FeatureExtraction(format!(
            "feature vector has {} values, expected {}",
            features.len(),
            layout.len()
        )));
    }
    Ok(features)
}
