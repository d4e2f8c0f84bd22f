use image::RgbImage;
use tracing::debug;

use crate::detect::rect::Rect;
use crate::detect::ObjectDetector;
use crate::imaging::{crop_gray, crop_rgb, to_gray};

/// Eyes a face region must contain to be classified.
pub const MIN_EYES: usize = 2;

/// A detected face region and the color pixels it bounds.
#[derive(Debug, Clone)]
pub struct FaceCrop {
    pub region: Rect,
    pub image: RgbImage,
}

/// Produces the face crops the classifier should see.
pub trait FaceDetector: Send + Sync {
    fn detect_faces(&self, img: &RgbImage) -> Vec<FaceCrop>;
}

/// Face detector that only keeps faces with at least two detected eyes.
///
/// Eye detection runs on the grayscale face crop, never on the whole image,
/// so eyes belonging to a neighbouring face cannot qualify a region.
pub struct TwoEyeFaceDetector {
    faces: Box<dyn ObjectDetector>,
    eyes: Box<dyn ObjectDetector>,
}

impl TwoEyeFaceDetector {
    pub fn new(faces: Box<dyn ObjectDetector>, eyes: Box<dyn ObjectDetector>) -> Self {
        TwoEyeFaceDetector { faces, eyes }
    }
}

impl FaceDetector for TwoEyeFaceDetector {
    fn detect_faces(&self, img: &RgbImage) -> Vec<FaceCrop> {
        let gray = to_gray(img);
        let candidates = self.faces.detect(&gray);
        debug!(candidates = candidates.len(), "face candidates");

        candidates
            .into_iter()
            .filter_map(|rect| {
                let region = rect.clip_to(img.width(), img.height());
                if region.is_empty() {
                    return None;
                }
                let roi_gray = crop_gray(&gray, &region);
                let eyes = self.eyes.detect(&roi_gray);
                debug!(?region, eyes = eyes.len(), "eye check");
                if eyes.len() >= MIN_EYES {
                    Some(FaceCrop { region, image: crop_rgb(img, &region) })
                } else {
                    None
                }
            })
            .collect()
    }
}
