use std::io::Write;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::crop_err;
use crate::error::{CropError, ErrorKind};

/// How hard the PNG encoder tries. Output is lossless either way.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, strum::EnumString, strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum PngCompression {
    Fast,
    #[default]
    Balanced,
    Best,
}

impl PngCompression {
    fn parameters(self) -> (CompressionType, FilterType) {
        match self {
            // Fast compression needs filtering for a reasonable ratio,
            // so pair it with the cheapest filter rather than none.
            PngCompression::Fast => (CompressionType::Fast, FilterType::Up),
            PngCompression::Balanced => (CompressionType::Default, FilterType::Adaptive),
            PngCompression::Best => (CompressionType::Best, FilterType::Adaptive),
        }
    }
}

pub fn encode<W: Write>(
    pixels: &RgbImage,
    writer: &mut W,
    compression: PngCompression,
) -> Result<(), CropError> {
    let (compression, filter) = compression.parameters();
    let encoder = PngEncoder::new_with_quality(writer, compression, filter);
    encoder
        .write_image(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| crop_err!(ErrorKind::Encode, "PNG encoding failed: {e}"))
}
