use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use image::RgbaImage;

/// A decoded source image, exclusively owned by one editing session.
///
/// Not `Clone`: there is exactly one owner, and dropping it releases the
/// loader's accounting for it.
#[derive(Debug)]
pub struct Bitmap {
    id: u64,
    pixels: RgbaImage,
    _lease: Lease,
}

impl Bitmap {
    pub(crate) fn new(id: u64, pixels: RgbaImage, lease: Lease) -> Self {
        Self {
            id,
            pixels,
            _lease: lease,
        }
    }

    /// Unique per loader, so bitmaps from successive sessions can be told apart.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Counts itself in a shared gauge for as long as it is alive.
#[derive(Debug)]
pub(crate) struct Lease {
    gauge: Arc<AtomicUsize>,
}

impl Lease {
    pub(crate) fn acquire(gauge: &Arc<AtomicUsize>) -> Self {
        gauge.fetch_add(1, Ordering::SeqCst);
        Self {
            gauge: Arc::clone(gauge),
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.gauge.fetch_sub(1, Ordering::SeqCst);
    }
}
