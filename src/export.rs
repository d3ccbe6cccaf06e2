//! Exporter: turns the export pass into the final asset.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbImage;
use log::debug;

use crate::{
    config::EditorConfig,
    contract::OutputContract,
    encoders,
    error::CropError,
    export_err,
    layout::CropWindow,
    operations::{crop::crop, resize::resize},
    render::Canvas,
};

/// The cropped image, handed over to the caller. Nothing in the editor keeps a
/// reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Lossless PNG encoding of the pixels.
    pub png: Vec<u8>,
    /// The same pixels as a self-contained `data:image/png;base64,...` URI.
    pub data_url: String,
    /// The decoded pixels, for callers that re-encode the crop.
    pub pixels: RgbImage,
    pub width: u32,
    pub height: u32,
}

impl ExportResult {
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

/// Crops the export pass to the crop window, resizes it to the contract and encodes it.
///
/// `canvas` must be an export pass: opaque, at device-pixel resolution, rendered with
/// the same transform the preview shows. Fails if the crop window has no area, which
/// happens when it is requested before the viewport has been laid out.
pub fn export(
    canvas: &Canvas,
    window: &CropWindow,
    contract: &OutputContract,
    config: &EditorConfig,
) -> Result<ExportResult, CropError> {
    let dpr = canvas.viewport().device_pixel_ratio;
    let rect = window
        .to_device_rect(dpr, canvas.size())
        .ok_or_else(|| export_err!("crop window {window:?} has no area on the canvas"))?;

    let (width, height) = contract.output_size(config.min_export_size);
    debug!(
        "exporting {}x{}+{}+{} device pixels as {width}x{height}",
        rect.width, rect.height, rect.x, rect.y
    );

    // the canvas is already composited over white, so the crop is opaque
    let cropped = crop(canvas.pixels(), rect);
    let resized = resize(&cropped, width, height, config.filter)?;

    let mut png = Vec::new();
    encoders::png::encode(&resized, &mut png, config.png_compression)?;
    let data_url = data_url("image/png", &png);

    Ok(ExportResult {
        png,
        data_url,
        pixels: resized,
        width,
        height,
    })
}

/// Embeds the bytes in a URI that can be used directly as an image source.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}
