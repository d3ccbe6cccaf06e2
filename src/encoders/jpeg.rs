use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::crop_err;
use crate::error::{CropError, ErrorKind};

/// `quality` is on the browser's 0.0–1.0 scale.
pub fn encode<W: Write>(pixels: &RgbImage, writer: &mut W, quality: f32) -> Result<(), CropError> {
    let quality = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
    let encoder = JpegEncoder::new_with_quality(writer, quality);
    encoder
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| crop_err!(ErrorKind::Encode, "JPEG encoding failed: {e}"))
}
