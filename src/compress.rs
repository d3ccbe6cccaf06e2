//! Upload compression for a confirmed crop: shrink the exported pixels to fit a
//! box and encode them lossy, preferring WebP and falling back to JPEG.

use log::{debug, warn};

use image::RgbImage;

use crate::{
    encoders,
    error::CropError,
    export::ExportResult,
    filter::Filter,
    operations::resize::{fit_within, resize},
};

#[derive(Debug, Copy, Clone, PartialEq, strum::EnumString, strum::IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Preset {
    Avatar,
    Banner,
}

impl Preset {
    pub fn settings(self) -> Compression {
        match self {
            Preset::Avatar => Compression {
                max_width: Some(600),
                max_height: Some(600),
                quality: 0.86,
            },
            Preset::Banner => Compression {
                max_width: Some(1200),
                max_height: Some(600),
                quality: 0.84,
            },
        }
    }
}

/// Output limits and quality (0.0–1.0) for [`compress`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Compression {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub quality: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressedFormat {
    WebP,
    Jpeg,
}

impl CompressedFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            CompressedFormat::WebP => "image/webp",
            CompressedFormat::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub format: CompressedFormat,
    pub width: u32,
    pub height: u32,
}

/// Compresses the pixels of a confirmed export.
pub fn compress_export(
    result: &ExportResult,
    settings: &Compression,
    filter: Filter,
) -> Result<CompressedImage, CropError> {
    compress(&result.pixels, settings, filter)
}

/// Never upscales. The input is opaque, as every export is.
pub fn compress(
    source: &RgbImage,
    settings: &Compression,
    filter: Filter,
) -> Result<CompressedImage, CropError> {
    let (width, height) = fit_within(
        source.width(),
        source.height(),
        settings.max_width,
        settings.max_height,
    );
    let pixels = if (width, height) == source.dimensions() {
        source.clone()
    } else {
        resize(source, width, height, filter)?
    };

    let (bytes, format) = match encoders::webp::encode(&pixels, settings.quality) {
        Ok(bytes) => (bytes, CompressedFormat::WebP),
        Err(err) => {
            warn!("falling back to JPEG: {err}");
            let mut bytes = Vec::new();
            let quality = (settings.quality + 0.05).min(0.9);
            encoders::jpeg::encode(&pixels, &mut bytes, quality)?;
            (bytes, CompressedFormat::Jpeg)
        }
    };
    debug!(
        "compressed {}x{} to {width}x{height} {} ({} bytes)",
        source.width(),
        source.height(),
        format.mime_type(),
        bytes.len()
    );

    Ok(CompressedImage {
        bytes,
        format,
        width,
        height,
    })
}
