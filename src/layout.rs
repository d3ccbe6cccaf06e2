//! Crop-Box Layout: where the fixed-ratio crop window sits inside the viewport.
//!
//! The window depends only on the viewport size and the aspect ratio. It is
//! stationary while the user pans and zooms; the image moves under it.

use log::warn;

use crate::config::EditorConfig;

/// Largest backing-store side, in device pixels. Bigger viewports are clamped.
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// Largest accepted device pixel ratio.
pub const MAX_PIXEL_RATIO: f64 = 8.0;

/// Measured size of the canvas element, in CSS pixels, plus the display density.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Negative or non-finite sizes collapse to zero; a bad pixel ratio becomes 1.
    ///
    /// The pixel ratio is capped at [`MAX_PIXEL_RATIO`] and each side at
    /// [`MAX_CANVAS_SIDE`] device pixels, so the canvas can always be allocated.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            if device_pixel_ratio > MAX_PIXEL_RATIO {
                warn!("device pixel ratio {device_pixel_ratio} is too large, using {MAX_PIXEL_RATIO}");
            }
            device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            warn!("ignoring invalid device pixel ratio {device_pixel_ratio}, using 1");
            1.0
        };
        let max_side = MAX_CANVAS_SIDE as f64 / device_pixel_ratio;
        let sanitize = |v: f64| {
            if !(v.is_finite() && v > 0.0) {
                0.0
            } else if v > max_side {
                warn!("viewport side {v} exceeds {MAX_CANVAS_SIDE} device pixels, clamping");
                max_side
            } else {
                v
            }
        };
        Self {
            width: sanitize(width),
            height: sanitize(height),
            device_pixel_ratio,
        }
    }

    /// Backing store size of the canvas in device pixels.
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            (self.width * self.device_pixel_ratio).round() as u32,
            (self.height * self.device_pixel_ratio).round() as u32,
        )
    }

    /// Geometric center of the canvas in device pixels.
    pub fn canvas_center(&self) -> (f64, f64) {
        let (w, h) = self.canvas_size();
        (w as f64 / 2.0, h as f64 / 2.0)
    }
}

/// Crop window in CSS pixels, relative to the viewport's top-left corner.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct CropWindow {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Whole-pixel rectangle in canvas (device pixel) space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Converts to device pixels with the same ratio the renderer uses, rounds
    /// to whole pixels and clips to the canvas. `None` if nothing is left.
    pub fn to_device_rect(&self, device_pixel_ratio: f64, canvas: (u32, u32)) -> Option<PixelRect> {
        if self.is_empty() {
            return None;
        }
        let (canvas_w, canvas_h) = (canvas.0 as f64, canvas.1 as f64);
        let x0 = (self.left * device_pixel_ratio).round().clamp(0.0, canvas_w);
        let y0 = (self.top * device_pixel_ratio).round().clamp(0.0, canvas_h);
        let x1 = (self.right() * device_pixel_ratio).round().clamp(0.0, canvas_w);
        let y1 = (self.bottom() * device_pixel_ratio).round().clamp(0.0, canvas_h);
        let rect = PixelRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        };
        if rect.width == 0 || rect.height == 0 {
            None
        } else {
            Some(rect)
        }
    }
}

/// Computes the centered crop window for the given viewport.
///
/// The width is a fraction of whichever viewport side limits it, then the height
/// is capped to a fraction of the viewport height, keeping `width / height == aspect_ratio`.
pub fn crop_window(viewport: &Viewport, aspect_ratio: f64, config: &EditorConfig) -> CropWindow {
    let (vw, vh) = (viewport.width, viewport.height);
    if vw <= 0.0 || vh <= 0.0 || !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
        return CropWindow::default();
    }

    let mut width = vw.min(vh * aspect_ratio) * config.crop_width_fraction;
    let mut height = width / aspect_ratio;
    let max_height = vh * config.crop_height_fraction;
    if height > max_height {
        height = max_height;
        width = height * aspect_ratio;
    }

    CropWindow {
        left: (vw - width) / 2.0,
        top: (vh - height) / 2.0,
        width,
        height,
    }
}
