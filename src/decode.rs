/// Image decoding for the classification pipeline.
///
/// Requests carry the picture as a base64 string, usually produced by a
/// browser `FileReader` and therefore prefixed with a data-URL header such as
/// `data:image/jpeg;base64,`.  Everything after the first comma is the
/// payload; a string without a comma is treated as bare base64.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbImage;

use crate::error::{ClassifierError, Result};

/// Strips an optional data-URL header and returns the base64 payload.
pub fn strip_data_url(input: &str) -> &str {
    match input.find(',') {
        Some(pos) => &input[pos + 1..],
        None => input,
    }
}

/// Decodes a (possibly data-URL-prefixed) base64 string into an RGB image.
pub fn decode_base64_image(input: &str) -> Result<RgbImage> {
    // Line-wrapped payloads (MIME, `base64` CLI) carry embedded newlines.
    let payload: String = strip_data_url(input.trim()).split_ascii_whitespace().collect();
    if payload.is_empty() {
        return Err(ClassifierError::Decode("empty image data".into()));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ClassifierError::Decode(e.to_string()))?;
    decode_image_bytes(&bytes)
}

/// Decodes an encoded image container (PNG, JPEG, BMP, GIF) into RGB.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<RgbImage> {
    if bytes.is_empty() {
        return Err(ClassifierError::Decode("decoded image data is empty".into()));
    }
    let img = image::load_from_memory(bytes).map_err(|e| ClassifierError::Decode(e.to_string()))?;
    let rgb = img.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(ClassifierError::Decode("image has zero dimensions".into()));
    }
    Ok(rgb)
}

/// Reads and decodes an image file from disk (offline use only).
pub fn decode_image_file(path: impl AsRef<Path>) -> Result<RgbImage> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_image_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb};
    use std::io::Cursor;

    fn png_base64(img: &RgbImage) -> String {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        STANDARD.encode(buf.into_inner())
    }

    #[test]
    fn decodes_plain_and_data_url_payloads() {
        let img = RgbImage::from_fn(7, 5, |x, y| Rgb([x as u8 * 30, y as u8 * 40, 200]));
        let b64 = png_base64(&img);

        let plain = decode_base64_image(&b64).unwrap();
        assert_eq!(plain, img);

        let with_header = format!("data:image/png;base64,{}", b64);
        let prefixed = decode_base64_image(&with_header).unwrap();
        assert_eq!(prefixed, img);
    }

    #[test]
    fn decodes_line_wrapped_payloads() {
        let img = RgbImage::from_fn(24, 16, |x, y| Rgb([(x * 37 % 256) as u8, (x * y % 256) as u8, (y * 91 % 256) as u8]));
        let b64 = png_base64(&img);
        let wrapped: Vec<&str> = b64
            .as_bytes()
            .chunks(76)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect();
        assert!(wrapped.len() > 1);

        assert_eq!(decode_base64_image(&wrapped.join("\n")).unwrap(), img);
        assert_eq!(decode_base64_image(&wrapped.join("\r\n")).unwrap(), img);
        let prefixed = format!("data:image/png;base64,{}\n", wrapped.join("\n"));
        assert_eq!(decode_base64_image(&prefixed).unwrap(), img);
    }

    #[test]
    fn strip_data_url_keeps_bare_payload() {
        assert_eq!(strip_data_url("abcd"), "abcd");
        assert_eq!(strip_data_url("data:image/png;base64,abcd"), "abcd");
    }

    #[test]
    fn empty_input_is_a_decode_error() {
        assert!(matches!(decode_base64_image(""), Err(ClassifierError::Decode(_))));
        assert!(matches!(decode_base64_image("data:image/png;base64,"), Err(ClassifierError::Decode(_))));
    }

    #[test]
    fn truncated_base64_is_a_decode_error() {
        let img = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let b64 = png_base64(&img);
        let truncated = &b64[..b64.len() - 3];
        assert!(matches!(decode_base64_image(truncated), Err(ClassifierError::Decode(_))));
    }

    #[test]
    fn valid_base64_of_non_image_is_a_decode_error() {
        let b64 = STANDARD.encode(b"definitely not a picture");
        assert!(matches!(decode_base64_image(&b64), Err(ClassifierError::Decode(_))));
    }
}
