use image::{ImageBuffer, Pixel};

/// Resizes an 8-bit image with bilinear interpolation using pixel-center
/// alignment: `src = (dst + 0.5) * scale - 0.5`, edge samples clamped.
///
/// An exact 2x reduction on both axes is computed as a 2x2 box average,
/// which is what OpenCV's `INTER_LINEAR` does on that path.  Feature vectors
/// must reproduce the preprocessing the classifier was trained with, so this
/// deliberately does not use `image::imageops::resize`.
///
/// Returns `None` for empty source or target dimensions.
pub fn resize_bilinear<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
) -> Option<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 || width == 0 || height == 0 {
        return None;
    }
    if sw == width && sh == height {
        return Some(src.clone());
    }

    let channels = P::CHANNEL_COUNT as usize;
    let data = if sw == width * 2 && sh == height * 2 {
        area_half(src.as_raw(), sw as usize, width as usize, height as usize, channels)
    } else {
        bilinear(src.as_raw(), sw as usize, sh as usize, width as usize, height as usize, channels)
    };
    ImageBuffer::from_raw(width, height, data)
}

fn area_half(raw: &[u8], sw: usize, dw: usize, dh: usize, channels: usize) -> Vec<u8> {
    let stride = sw * channels;
    let mut out = Vec::with_capacity(dw * dh * channels);
    for dy in 0..dh {
        let row0 = &raw[(dy * 2) * stride..];
        let row1 = &raw[(dy * 2 + 1) * stride..];
        for dx in 0..dw {
            for c in 0..channels {
                let i0 = dx * 2 * channels + c;
                let i1 = i0 + channels;
                let sum = row0[i0] as u32 + row0[i1] as u32 + row1[i0] as u32 + row1[i1] as u32;
                out.push(((sum + 2) >> 2) as u8);
            }
        }
    }
    out
}

/// Source index pair and the weight of the second sample for one axis.
fn axis_taps(dst_len: usize, src_len: usize) -> Vec<(usize, usize, f32)> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len - 1;
    (0..dst_len)
        .map(|d| {
            let f = (d as f32 + 0.5) * scale - 0.5;
            let f0 = f.floor();
            let frac = f - f0;
            let i0 = f0 as i64;
            let lo = i0.clamp(0, last as i64) as usize;
            let hi = (i0 + 1).clamp(0, last as i64) as usize;
            (lo, hi, frac)
        })
        .collect()
}

fn bilinear(raw: &[u8], sw: usize, sh: usize, dw: usize, dh: usize, channels: usize) -> Vec<u8> {
    let xs = axis_taps(dw, sw);
    let ys = axis_taps(dh, sh);
    let stride = sw * channels;
    let mut out = Vec::with_capacity(dw * dh * channels);

    for &(y0, y1, wy) in &ys {
        let r0 = &raw[y0 * stride..(y0 + 1) * stride];
        let r1 = &raw[y1 * stride..(y1 + 1) * stride];
        for &(x0, x1, wx) in &xs {
            for c in 0..channels {
                let p00 = r0[x0 * channels + c] as f32;
                let p01 = r0[x1 * channels + c] as f32;
                let p10 = r1[x0 * channels + c] as f32;
                let p11 = r1[x1 * channels + c] as f32;
                let top = p00 + (p01 - p00) * wx;
                let bottom = p10 + (p11 - p10) * wx;
                let v = top + (bottom - top) * wy;
                out.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn constant_image_stays_constant() {
        let img = RgbImage::from_pixel(45, 71, Rgb([12, 200, 99]));
        let out = resize_bilinear(&img, 32, 32).unwrap();
        assert_eq!(out.dimensions(), (32, 32));
        assert!(out.pixels().all(|p| *p == Rgb([12, 200, 99])));
    }

    #[test]
    fn exact_half_is_box_average() {
        let img = GrayImage::from_raw(2, 2, vec![10, 20, 30, 41]).unwrap();
        let out = resize_bilinear(&img, 1, 1).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Luma([25]));
    }

    #[test]
    fn upscale_interpolates_between_neighbours() {
        let img = GrayImage::from_raw(2, 1, vec![0, 100]).unwrap();
        let out = resize_bilinear(&img, 4, 1).unwrap();
        // Centers map to -0.25, 0.25, 0.75, 1.25 in source space.
        assert_eq!(out.as_raw(), &vec![0, 25, 75, 100]);
    }

    #[test]
    fn empty_dimensions_are_rejected() {
        let img = GrayImage::new(0, 5);
        assert!(resize_bilinear(&img, 32, 32).is_none());
        let img = GrayImage::new(3, 3);
        assert!(resize_bilinear(&img, 0, 32).is_none());
    }
}
