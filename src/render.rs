//! Renderer: paints the bitmap through the transform onto a canvas.
//!
//! The preview pass and the export pass share [`paint`]; they only differ in which
//! canvas they draw on.

use image::{Rgb, RgbImage, RgbaImage};

use crate::{bitmap::Bitmap, layout::Viewport, transform::Transform};

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// An opaque drawing surface at device-pixel resolution.
#[derive(Debug, Clone)]
pub struct Canvas {
    viewport: Viewport,
    pixels: RgbImage,
}

impl Canvas {
    /// Backing store is `round(css size × device pixel ratio)`, filled white.
    pub fn new(viewport: Viewport) -> Self {
        let (width, height) = viewport.canvas_size();
        Self {
            viewport,
            pixels: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }

    /// An offscreen surface matching this canvas pixel for pixel.
    pub fn offscreen_like(&self) -> Self {
        Self::new(self.viewport)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbImage {
        self.pixels
    }
}

/// Clears the canvas to white and draws the bitmap centered on
/// `(translate_x, translate_y)`, rotated by `angle` and scaled by `scale`.
///
/// Works backwards from each canvas pixel to the bitmap with bilinear sampling.
/// Bitmap alpha is composited over the white background.
pub fn paint(canvas: &mut Canvas, bitmap: &Bitmap, transform: &Transform) {
    let pixels = &mut canvas.pixels;
    for pixel in pixels.pixels_mut() {
        *pixel = BACKGROUND;
    }
    if !(transform.scale.is_finite() && transform.scale > 0.0) {
        return;
    }

    let source = bitmap.pixels();
    let size = bitmap.dimensions();
    let Some((x0, y0, x1, y1)) = covered_area(transform, size, pixels.dimensions()) else {
        return;
    };

    let (src_w, src_h) = (size.0 as f64, size.1 as f64);
    for y in y0..y1 {
        for x in x0..x1 {
            let (u, v) = transform.canvas_to_bitmap(x as f64 + 0.5, y as f64 + 0.5, size);
            if u < 0.0 || v < 0.0 || u >= src_w || v >= src_h {
                continue;
            }
            let [r, g, b, a] = sample_bilinear(source, u - 0.5, v - 0.5);
            pixels.put_pixel(x, y, over_background([r, g, b], a));
        }
    }
}

/// Canvas pixel range `[x0, x1) × [y0, y1)` that the transformed bitmap can touch.
fn covered_area(
    transform: &Transform,
    bitmap: (u32, u32),
    canvas: (u32, u32),
) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = (bitmap.0 as f64, bitmap.1 as f64);
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
        .map(|(u, v)| transform.bitmap_to_canvas(u, v, bitmap));
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let clip = |v: f64, limit: u32| v.clamp(0.0, limit as f64) as u32;
    let x0 = clip(min_x.floor(), canvas.0);
    let x1 = clip(max_x.ceil(), canvas.0);
    let y0 = clip(min_y.floor(), canvas.1);
    let y1 = clip(max_y.ceil(), canvas.1);
    if x0 >= x1 || y0 >= y1 {
        None
    } else {
        Some((x0, y0, x1, y1))
    }
}

/// Samples at continuous pixel-center coordinates, clamping to the edge.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> [f64; 4] {
    let max_x = image.width() - 1;
    let max_y = image.height() - 1;
    let x = x.max(0.0);
    let y = y.max(0.0);
    let x_lo = (x.floor() as u32).min(max_x);
    let y_lo = (y.floor() as u32).min(max_y);
    let x_hi = (x_lo + 1).min(max_x);
    let y_hi = (y_lo + 1).min(max_y);
    let fx = x - x.floor();
    let fy = y - y.floor();

    let px = |x: u32, y: u32| image.get_pixel(x, y).0.map(f64::from);
    let (a, b, c, d) = (px(x_lo, y_lo), px(x_hi, y_lo), px(x_lo, y_hi), px(x_hi, y_hi));
    let mut out = [0.0; 4];
    for i in 0..4 {
        let top = a[i] + (b[i] - a[i]) * fx;
        let bottom = c[i] + (d[i] - c[i]) * fx;
        out[i] = top + (bottom - top) * fy;
    }
    out
}

/// Composites a color with 0–255 alpha over the white background.
fn over_background(color: [f64; 3], alpha: f64) -> Rgb<u8> {
    let a = (alpha / 255.0).clamp(0.0, 1.0);
    let bg = BACKGROUND.0.map(f64::from);
    Rgb([0usize, 1, 2].map(|i| (color[i] * a + bg[i] * (1.0 - a)).round().clamp(0.0, 255.0) as u8))
}
