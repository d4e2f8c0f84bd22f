use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::imaging::to_gray;
use crate::math::matrix::Matrix;
use crate::wavelet::dwt::{wavedec2, waverec2};
use crate::wavelet::family::Wavelet;

/// Wavelet family and decomposition depth used for texture features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveletConfig {
    pub wavelet: String,
    pub level: usize,
}

impl Default for WaveletConfig {
    fn default() -> Self {
        WaveletConfig { wavelet: "db1".into(), level: 5 }
    }
}

/// Color front-end of [`wavelet_detail`]: converts to grayscale first.
pub fn wavelet_detail_rgb(img: &RgbImage, config: &WaveletConfig) -> Result<GrayImage> {
    wavelet_detail(&to_gray(img), config)
}

/// Returns the high-frequency content of `gray`.
///
/// Pixels are scaled to [0, 1], decomposed `level` times, the approximation
/// band is zeroed and the remaining detail bands are reconstructed and
/// scaled back to 8 bits.  Negative reconstructions wrap modulo 256 after
/// truncation toward zero, reproducing the integer conversion the stored
/// classifiers were trained against.
///
/// Odd dimensions may come back one pixel larger.
pub fn wavelet_detail(gray: &GrayImage, config: &WaveletConfig) -> Result<GrayImage> {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return Err(ClassifierError::FeatureExtraction("empty image region".into()));
    }
    let wavelet = Wavelet::from_name(&config.wavelet)?;

    let plane = Matrix::from_data(
        gray.rows()
            .map(|row| row.map(|p| p.0[0] as f64 / 255.0).collect())
            .collect(),
    );

    let mut coeffs = wavedec2(&plane, &wavelet, config.level)?;
    coeffs.approx = coeffs.approx.map(|_| 0.0);
    let detail = waverec2(&coeffs, &wavelet)?;

    let data: Vec<u8> = detail
        .data
        .iter()
        .flat_map(|row| row.iter().map(|&v| quantize(v * 255.0)))
        .collect();
    GrayImage::from_raw(detail.cols as u32, detail.rows as u32, data)
        .ok_or_else(|| ClassifierError::FeatureExtraction("reconstructed plane has no pixels".into()))
}

#[inline]
fn quantize(v: f64) -> u8 {
    (v as i32) as u8
}
