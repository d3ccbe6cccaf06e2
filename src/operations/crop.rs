use image::{imageops, RgbImage};

use crate::layout::PixelRect;

/// Copies the rectangle out of the canvas. The rectangle must lie inside it,
/// which [`CropWindow::to_device_rect`](crate::layout::CropWindow::to_device_rect) guarantees.
pub fn crop(pixels: &RgbImage, rect: PixelRect) -> RgbImage {
    imageops::crop_imm(pixels, rect.x, rect.y, rect.width, rect.height).to_image()
}
