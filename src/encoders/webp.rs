use image::{DynamicImage, RgbImage};
use webp::{Encoder, WebPMemory};

use crate::crop_err;
use crate::error::{CropError, ErrorKind};

/// Lossy WebP. `quality` is on the browser's 0.0–1.0 scale.
pub fn encode(pixels: &RgbImage, quality: f32) -> Result<Vec<u8>, CropError> {
    let image = DynamicImage::ImageRgb8(pixels.clone());
    let encoder: Encoder = Encoder::from_image(&image)
        .map_err(|e| crop_err!(ErrorKind::Encode, "WebP encoder rejected the image: {e}"))?;
    let quality = quality.clamp(0.0, 1.0) * 100.0;

    let webp: WebPMemory = encoder
        .encode_simple(false, quality)
        .map_err(|e| crop_err!(ErrorKind::Encode, "WebP encoding failed: {e:?}"))?;
    Ok(webp.to_vec())
}
