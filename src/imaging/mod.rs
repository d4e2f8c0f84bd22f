pub mod color;
pub mod resize;

pub use color::{crop_gray, crop_rgb, to_gray};
pub use resize::resize_bilinear;
