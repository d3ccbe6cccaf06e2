//! The current view: how the bitmap is placed on the canvas.

use crate::{
    config::{EditorConfig, ScaleBounds},
    layout::{CropWindow, Viewport},
};

/// Placement of the bitmap center on the canvas, in device pixels.
///
/// `scale` is kept inside the configured [`ScaleBounds`] by every mutator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    /// Radians. Always 0 at rest; rendering honours it regardless.
    pub angle: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            angle: 0.0,
        }
    }
}

impl Transform {
    /// Initial view: bitmap centered on the canvas and just large enough to fill
    /// the crop window, plus a small overscan.
    ///
    /// The crop window is measured in device pixels here, the same space the
    /// bitmap is drawn in, so the window is filled at any pixel ratio.
    pub fn cover(
        bitmap: (u32, u32),
        crop: &CropWindow,
        viewport: &Viewport,
        config: &EditorConfig,
    ) -> Self {
        let (center_x, center_y) = viewport.canvas_center();
        Self {
            scale: config
                .scale_bounds()
                .clamp(cover_scale(bitmap, crop, viewport.device_pixel_ratio) * config.cover_overscan),
            translate_x: center_x,
            translate_y: center_y,
            angle: 0.0,
        }
    }

    /// Sets the scale directly, e.g. from a slider. Non-finite values are ignored.
    pub fn set_scale(&mut self, value: f64, bounds: ScaleBounds) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.scale = bounds.clamp(value);
        true
    }

    /// Multiplies the scale by `factor`, clamped.
    pub fn zoom_by(&mut self, factor: f64, bounds: ScaleBounds) -> bool {
        self.set_scale(self.scale * factor, bounds)
    }

    pub fn translate_by(&mut self, dx: f64, dy: f64) -> bool {
        if !(dx.is_finite() && dy.is_finite()) {
            return false;
        }
        self.translate_x += dx;
        self.translate_y += dy;
        true
    }

    /// Maps a canvas point back into bitmap pixel coordinates (origin top-left).
    pub fn canvas_to_bitmap(&self, x: f64, y: f64, bitmap: (u32, u32)) -> (f64, f64) {
        let (sin, cos) = self.angle.sin_cos();
        let dx = x - self.translate_x;
        let dy = y - self.translate_y;
        // undo rotate(angle) then scale(scale)
        let u = (cos * dx + sin * dy) / self.scale;
        let v = (-sin * dx + cos * dy) / self.scale;
        (u + bitmap.0 as f64 / 2.0, v + bitmap.1 as f64 / 2.0)
    }

    /// Maps a bitmap point (origin top-left) onto the canvas.
    pub fn bitmap_to_canvas(&self, u: f64, v: f64, bitmap: (u32, u32)) -> (f64, f64) {
        let (sin, cos) = self.angle.sin_cos();
        let x = (u - bitmap.0 as f64 / 2.0) * self.scale;
        let y = (v - bitmap.1 as f64 / 2.0) * self.scale;
        (
            cos * x - sin * y + self.translate_x,
            sin * x + cos * y + self.translate_y,
        )
    }
}

/// Smallest scale at which the bitmap covers the crop window, without overscan.
pub fn cover_scale(bitmap: (u32, u32), crop: &CropWindow, device_pixel_ratio: f64) -> f64 {
    let crop_w = crop.width * device_pixel_ratio;
    let crop_h = crop.height * device_pixel_ratio;
    (crop_w / bitmap.0 as f64).max(crop_h / bitmap.1 as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::crop_window;
    use crate::utils::arbitrary;
    use quickcheck_macros::quickcheck;
    use std::num::NonZeroU16;

    #[test]
    fn test_cover_wide_source_in_square_window() {
        let config = EditorConfig::default();
        let viewport = Viewport::new(400.0, 300.0, 1.0);
        let crop = crop_window(&viewport, 1.0, &config);
        let transform = Transform::cover((2000, 1000), &crop, &viewport, &config);
        assert!((transform.scale - crop.height / 1000.0 * 1.02).abs() < 1e-12);
        assert_eq!((transform.translate_x, transform.translate_y), (200.0, 150.0));
        assert_eq!(transform.angle, 0.0);
    }

    #[test]
    fn test_cover_is_clamped() {
        let config = EditorConfig::default();
        let viewport = Viewport::new(400.0, 300.0, 1.0);
        let crop = crop_window(&viewport, 1.0, &config);
        assert_eq!(
            Transform::cover((1, 1), &crop, &viewport, &config).scale,
            config.max_scale
        );
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let bounds = ScaleBounds::new(0.1, 20.0);
        let mut transform = Transform::default();
        assert!(!transform.set_scale(f64::NAN, bounds));
        assert!(!transform.translate_by(f64::INFINITY, 0.0));
        assert_eq!(transform, Transform::default());
    }

    #[test]
    fn test_mapping_roundtrip_with_rotation() {
        let transform = Transform {
            scale: 0.75,
            translate_x: 120.0,
            translate_y: -30.0,
            angle: 0.4,
        };
        let (x, y) = transform.bitmap_to_canvas(13.0, 70.0, (64, 128));
        let (u, v) = transform.canvas_to_bitmap(x, y, (64, 128));
        assert!((u - 13.0).abs() < 1e-9 && (v - 70.0).abs() < 1e-9);
    }

    #[quickcheck]
    fn zoom_stays_within_bounds(start: f64, factors: Vec<f64>) -> bool {
        let bounds = ScaleBounds::new(0.1, 20.0);
        let mut transform = Transform::default();
        transform.set_scale(start, bounds);
        factors.into_iter().all(|factor| {
            transform.zoom_by(factor, bounds);
            (bounds.min()..=bounds.max()).contains(&transform.scale)
        })
    }

    #[quickcheck]
    fn cover_fills_crop_window(
        bitmap_w: NonZeroU16,
        bitmap_h: NonZeroU16,
        viewport_w: u16,
        viewport_h: u16,
        ratio_seed: f64,
        dpr_seed: u8,
    ) -> bool {
        let config = EditorConfig::default();
        let bitmap = (bitmap_w.get() as u32, bitmap_h.get() as u32);
        let viewport = Viewport::new(
            viewport_w as f64,
            viewport_h as f64,
            arbitrary::pixel_ratio_from(dpr_seed),
        );
        let crop = crop_window(&viewport, arbitrary::ratio_from(ratio_seed), &config);
        let transform = Transform::cover(bitmap, &crop, &viewport, &config);
        let needed = cover_scale(bitmap, &crop, viewport.device_pixel_ratio);
        if needed * config.cover_overscan > config.max_scale {
            // bounds win over coverage for tiny sources
            return transform.scale == config.max_scale;
        }
        let dpr = viewport.device_pixel_ratio;
        transform.scale * bitmap.0 as f64 >= crop.width * dpr
            && transform.scale * bitmap.1 as f64 >= crop.height * dpr
    }
}
