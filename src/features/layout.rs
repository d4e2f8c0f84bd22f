use serde::{Deserialize, Serialize};

use crate::wavelet::WaveletConfig;

/// Order of the color samples in the raw-pixel block of a feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Blue, green, red: the order the bundled models were trained with.
    #[default]
    Bgr,
    Rgb,
}

/// Shape of the vector a classifier expects.
///
/// The raw crop and its wavelet detail image are both resized to
/// `side × side`; the vector is the raw block (`side² × 3`, interleaved)
/// followed by the wavelet block (`side²`).  Every field must match what the
/// model was trained on or predictions are meaningless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureLayout {
    pub side: u32,
    pub channel_order: ChannelOrder,
    #[serde(flatten)]
    pub wavelet: WaveletConfig,
}

impl Default for FeatureLayout {
    fn default() -> Self {
        FeatureLayout {
            side: 32,
            channel_order: ChannelOrder::Bgr,
            wavelet: WaveletConfig::default(),
        }
    }
}

impl FeatureLayout {
    pub fn raw_len(&self) -> usize {
        (self.side * self.side * 3) as usize
    }

    pub fn wavelet_len(&self) -> usize {
        (self.side * self.side) as usize
    }

    pub fn len(&self) -> usize {
        self.raw_len() + self.wavelet_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_4096_values() {
        let layout = FeatureLayout::default();
        assert_eq!(layout.raw_len(), 3072);
        assert_eq!(layout.wavelet_len(), 1024);
        assert_eq!(layout.len(), 4096);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let layout: FeatureLayout = serde_json::from_str(r#"{"level": 3, "channel_order": "rgb"}"#).unwrap();
        assert_eq!(layout.side, 32);
        assert_eq!(layout.wavelet.level, 3);
        assert_eq!(layout.wavelet.wavelet, "db1");
        assert_eq!(layout.channel_order, ChannelOrder::Rgb);
    }
}
