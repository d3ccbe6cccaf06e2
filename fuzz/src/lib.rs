use std::num::NonZeroU8;

use arbitrary::{Arbitrary, Unstructured};
use cropkit::{InputEvent, Key, Viewport};

#[derive(Debug)]
pub struct StructuredImage {
    pub width: NonZeroU8,
    pub height: NonZeroU8,
    pub rgba_data: Vec<u8>,
}

impl StructuredImage {
    pub fn to_png(&self) -> Vec<u8> {
        use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};

        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                &self.rgba_data,
                self.width.get() as u32,
                self.height.get() as u32,
                ExtendedColorType::Rgba8,
            )
            .expect("in-memory PNG encoding failed");
        bytes
    }
}

impl<'a> Arbitrary<'a> for StructuredImage {
    fn arbitrary(unstructured: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let width: NonZeroU8 = unstructured.arbitrary()?;
        let height: NonZeroU8 = unstructured.arbitrary()?;
        let len = width.get() as usize * height.get() as usize * 4;
        let rgba_data = unstructured.bytes(len)?;

        Ok(Self {
            width,
            height,
            rgba_data: rgba_data.to_vec(),
        })
    }
}

/// Input events with coordinates small enough to stay meaningful on a fuzzed viewport.
#[derive(Debug, Arbitrary)]
pub enum FuzzEvent {
    Down(i16, i16),
    Move(i16, i16),
    Up,
    Cancel,
    Wheel(i8),
    Slider(f32),
    ZoomIn,
    ZoomOut,
    Reset,
    Resize(u8, u8),
}

impl FuzzEvent {
    pub fn to_input(&self, device_pixel_ratio: f64) -> InputEvent {
        match *self {
            FuzzEvent::Down(x, y) => InputEvent::PointerDown {
                x: x as f64,
                y: y as f64,
            },
            FuzzEvent::Move(x, y) => InputEvent::PointerMove {
                x: x as f64,
                y: y as f64,
            },
            FuzzEvent::Up => InputEvent::PointerUp,
            FuzzEvent::Cancel => InputEvent::PointerCancel,
            FuzzEvent::Wheel(delta) => InputEvent::Wheel {
                delta_y: delta as f64,
            },
            FuzzEvent::Slider(value) => InputEvent::Slider(value as f64),
            FuzzEvent::ZoomIn => InputEvent::Key(Key::ZoomIn),
            FuzzEvent::ZoomOut => InputEvent::Key(Key::ZoomOut),
            FuzzEvent::Reset => InputEvent::Reset,
            FuzzEvent::Resize(w, h) => InputEvent::Resize(Viewport::new(
                w as f64 * 2.0,
                h as f64 * 2.0,
                device_pixel_ratio,
            )),
        }
    }
}

pub const PIXEL_RATIOS: [f64; 5] = [1.0, 1.25, 1.5, 2.0, 3.0];
