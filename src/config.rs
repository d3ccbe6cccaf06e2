//! Editor configuration.
//!
//! Everything the editor would otherwise read from shared globals lives here and is
//! handed to [`Editor::new`](crate::editor::Editor::new). The editor never mutates it.

use crate::{encoders::png::PngCompression, filter::Filter};

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Lower bound of the zoom factor. Zoom is clamped, never rejected.
    pub min_scale: f64,
    /// Upper bound of the zoom factor.
    pub max_scale: f64,
    /// Multiplier applied per wheel tick or `+`/`-` key press.
    pub zoom_step: f64,
    /// Extra margin on top of the cover scale so rounding never exposes the background.
    pub cover_overscan: f64,
    /// Crop window width as a fraction of the viewport (before the height limit kicks in).
    pub crop_width_fraction: f64,
    /// Maximum crop window height as a fraction of the viewport height.
    pub crop_height_fraction: f64,
    /// Exports are never narrower than this, whatever the caller asks for.
    pub min_export_size: u32,
    pub filter: Filter,
    pub png_compression: PngCompression,
    /// Range of the external zoom slider, used to compute its displayed value.
    pub slider_range: (f64, f64),
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 20.0,
            zoom_step: 1.08,
            cover_overscan: 1.02,
            crop_width_fraction: 0.76,
            crop_height_fraction: 0.86,
            min_export_size: 64,
            filter: Filter::default(),
            png_compression: PngCompression::default(),
            slider_range: (0.1, 20.0),
        }
    }
}

impl EditorConfig {
    pub fn scale_bounds(&self) -> ScaleBounds {
        ScaleBounds::new(self.min_scale, self.max_scale)
    }
}

/// Inclusive `[min, max]` range for the zoom factor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScaleBounds {
    min: f64,
    max: f64,
}

impl ScaleBounds {
    /// Swaps the bounds if they are given in the wrong order.
    /// Non-finite bounds fall back to the editor defaults.
    pub fn new(min: f64, max: f64) -> Self {
        let min = if min.is_finite() { min } else { 0.1 };
        let max = if max.is_finite() { max } else { 20.0 };
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}
