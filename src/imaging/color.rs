use image::{GrayImage, ImageBuffer, Luma, RgbImage};

use crate::detect::rect::Rect;

// BT.601 luma in 14-bit fixed point; `image`'s `to_luma8` uses Rec.709.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Converts an RGB image to single-channel grayscale.
pub fn to_gray(img: &RgbImage) -> GrayImage {
    let (w, h) = img.dimensions();
    let data: Vec<u8> = img
        .as_raw()
        .chunks_exact(3)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect();
    ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(w, h, data)
        .unwrap_or_else(|| GrayImage::new(w, h))
}

#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT + (1 << (SHIFT - 1));
    (y >> SHIFT).min(255) as u8
}

/// Crops `rect` out of a color image, clipped to the image bounds.
pub fn crop_rgb(img: &RgbImage, rect: &Rect) -> RgbImage {
    let r = rect.clip_to(img.width(), img.height());
    image::imageops::crop_imm(img, r.x as u32, r.y as u32, r.width as u32, r.height as u32).to_image()
}

/// Crops `rect` out of a grayscale image, clipped to the image bounds.
pub fn crop_gray(img: &GrayImage, rect: &Rect) -> GrayImage {
    let r = rect.clip_to(img.width(), img.height());
    image::imageops::crop_imm(img, r.x as u32, r.y as u32, r.width as u32, r.height as u32).to_image()
}
