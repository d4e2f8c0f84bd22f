pub mod cascade;
pub mod face_eye;
pub mod grouping;
pub mod rect;

use image::GrayImage;

pub use cascade::{CascadeDetector, DetectionParams, HaarCascade};
pub use face_eye::{FaceCrop, FaceDetector, TwoEyeFaceDetector};
pub use rect::Rect;

/// Pluggable object detection backend.
///
/// Implement this trait to swap the Haar cascades for another detector.
/// Rectangles are returned in the backend's native order.
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage) -> Vec<Rect>;
}
