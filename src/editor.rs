//! Session lifecycle: `open → interact → confirm | cancel | close`.
//!
//! An [`Editor`] holds at most one [`Session`]. The session owns the bitmap, the
//! preview canvas and the view state. Every exit path drops the session, and that
//! releases the bitmap.

use log::debug;

use crate::{
    bitmap::Bitmap,
    config::EditorConfig,
    contract::OutputContract,
    crop_err,
    decode::{Loader, Source},
    error::{CropError, ErrorKind},
    export::{self, ExportResult},
    interaction::{self, Controls, Effect, InputEvent, PointerState},
    layout::{crop_window, CropWindow, Viewport},
    render::{paint, Canvas},
    transform::Transform,
};

/// How a session ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed(ExportResult),
    Cancelled,
}

impl Outcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn into_export(self) -> Option<ExportResult> {
        match self {
            Outcome::Confirmed(result) => Some(result),
            Outcome::Cancelled => None,
        }
    }
}

/// State of one open editing session.
#[derive(Debug)]
pub struct Session {
    contract: OutputContract,
    bitmap: Bitmap,
    viewport: Viewport,
    crop: CropWindow,
    transform: Transform,
    pointer: PointerState,
    canvas: Canvas,
    repaints: u64,
}

impl Session {
    fn new(bitmap: Bitmap, contract: OutputContract, viewport: Viewport, config: &EditorConfig) -> Self {
        let crop = crop_window(&viewport, contract.aspect_ratio, config);
        let transform = Transform::cover(bitmap.dimensions(), &crop, &viewport, config);
        let mut session = Self {
            contract,
            bitmap,
            viewport,
            crop,
            transform,
            pointer: PointerState::Idle,
            canvas: Canvas::new(viewport),
            repaints: 0,
        };
        session.repaint();
        session
    }

    pub fn contract(&self) -> &OutputContract {
        &self.contract
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn crop_window(&self) -> &CropWindow {
        &self.crop
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// The preview as last painted.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Number of preview passes so far, including the one on open.
    pub fn repaints(&self) -> u64 {
        self.repaints
    }

    /// Value to show on an external zoom slider: the scale clamped to the
    /// slider's own range, two decimals.
    pub fn slider_value(&self, config: &EditorConfig) -> String {
        let (min, max) = config.slider_range;
        format!("{:.2}", self.transform.scale.max(min).min(max))
    }

    fn repaint(&mut self) {
        paint(&mut self.canvas, &self.bitmap, &self.transform);
        self.repaints += 1;
    }

    fn reset(&mut self, config: &EditorConfig) {
        self.transform = Transform::cover(self.bitmap.dimensions(), &self.crop, &self.viewport, config);
        debug!("reset to scale {}", self.transform.scale);
        self.repaint();
    }

    fn relayout(&mut self, viewport: Viewport, config: &EditorConfig) {
        self.viewport = viewport;
        self.crop = crop_window(&viewport, self.contract.aspect_ratio, config);
        self.canvas = Canvas::new(viewport);
        debug!(
            "relayout to {}x{} at {}x, crop window {:?}",
            viewport.width, viewport.height, viewport.device_pixel_ratio, self.crop
        );
        self.repaint();
    }

    fn export(&self, config: &EditorConfig) -> Result<ExportResult, CropError> {
        let mut offscreen = self.canvas.offscreen_like();
        paint(&mut offscreen, &self.bitmap, &self.transform);
        export::export(&offscreen, &self.crop, &self.contract, config)
    }
}

/// Interactive cropper. Owns the configuration and at most one open session.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    loader: Loader,
    session: Option<Session>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            loader: Loader::new(),
            session: None,
        }
    }

    /// Loads the source and opens a session showing it.
    ///
    /// Fails with [`ErrorKind::Busy`] if a session is already open, and leaves the
    /// editor closed if the contract is invalid or the source cannot be decoded.
    pub fn open(
        &mut self,
        source: Source,
        contract: OutputContract,
        viewport: Viewport,
    ) -> Result<(), CropError> {
        if self.session.is_some() {
            return Err(crop_err!(ErrorKind::Busy, "a crop session is already open"));
        }
        contract.validate()?;
        let bitmap = self.loader.load(&source)?;
        debug!(
            "opening bitmap #{} ({}x{}) for {:?} output",
            bitmap.id(),
            bitmap.width(),
            bitmap.height(),
            contract.output_size(self.config.min_export_size)
        );
        let session = Session::new(bitmap, contract, viewport, &self.config);
        debug!(
            "crop window {:?}, initial scale {}",
            session.crop, session.transform.scale
        );
        self.session = Some(session);
        Ok(())
    }

    /// Feeds one input event to the open session.
    ///
    /// Returns an outcome when the event ended the session (Escape or Enter).
    pub fn handle(&mut self, event: InputEvent) -> Result<Option<Outcome>, CropError> {
        let config = &self.config;
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| crop_err!(ErrorKind::NotOpen, "no crop session is open"))?;

        let controls = Controls {
            bounds: config.scale_bounds(),
            zoom_step: config.zoom_step,
            device_pixel_ratio: session.viewport.device_pixel_ratio,
        };
        let step = interaction::step(session.pointer, session.transform, &event, &controls);
        session.pointer = step.state;
        session.transform = step.transform;

        match step.effect {
            Effect::None => Ok(None),
            Effect::Repaint => {
                session.repaint();
                Ok(None)
            }
            Effect::Reset => {
                session.reset(config);
                Ok(None)
            }
            Effect::Relayout(viewport) => {
                session.relayout(viewport, config);
                Ok(None)
            }
            Effect::Cancel => Ok(Some(self.cancel())),
            Effect::Confirm => self.confirm().map(Some),
        }
    }

    /// Exports the current view and closes the session.
    ///
    /// On error the session stays open so the user can adjust and retry.
    pub fn confirm(&mut self) -> Result<Outcome, CropError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| crop_err!(ErrorKind::NotOpen, "no crop session is open"))?;
        let result = session.export(&self.config)?;
        debug!("confirmed {}x{} export", result.width, result.height);
        self.close();
        Ok(Outcome::Confirmed(result))
    }

    /// Closes the session without exporting. Harmless when nothing is open.
    pub fn cancel(&mut self) -> Outcome {
        if self.session.is_some() {
            debug!("cancelled");
        }
        self.close();
        Outcome::Cancelled
    }

    /// Drops the session, if any, and with it the bitmap.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            debug!("closing session for bitmap #{}", session.bitmap.id());
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interaction::Key, render::BACKGROUND};
    use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

    fn png_source(width: u32, height: u32, color: [u8; 4]) -> Source {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
            .unwrap();
        Source::Bytes(bytes)
    }

    fn open_editor(contract: OutputContract) -> Editor {
        let mut editor = Editor::new(EditorConfig::default());
        editor
            .open(
                png_source(2000, 1000, [200, 40, 40, 255]),
                contract,
                Viewport::new(400.0, 300.0, 1.0),
            )
            .unwrap();
        editor
    }

    #[test]
    fn test_wide_source_exports_square_avatar_without_background() {
        let mut editor = open_editor(OutputContract::avatar());
        let session = editor.session().unwrap();
        let expected = session.crop_window().height / 1000.0 * 1.02;
        assert!((session.transform().scale - expected).abs() < 1e-9);
        assert_eq!(session.repaints(), 1);

        let result = editor.confirm().unwrap().into_export().unwrap();
        assert_eq!((result.width, result.height), (512, 512));
        let decoded = image::load_from_memory(&result.png).unwrap().to_rgb8();
        assert!(decoded.pixels().all(|p| p.0 != [255, 255, 255]));
        assert!(!editor.is_open());
        assert_eq!(editor.loader().live_bitmaps(), 0);
    }

    #[test]
    fn test_fractional_pixel_ratios_cover_the_crop() {
        for dpr in [1.25, 1.5, 2.0] {
            for contract in [OutputContract::avatar(), OutputContract::banner()] {
                let mut editor = Editor::new(EditorConfig::default());
                editor
                    .open(
                        png_source(2000, 1000, [200, 40, 40, 255]),
                        contract,
                        Viewport::new(400.0, 300.0, dpr),
                    )
                    .unwrap();

                let session = editor.session().unwrap();
                let canvas = session.canvas();
                let rect = session
                    .crop_window()
                    .to_device_rect(dpr, canvas.size())
                    .unwrap();
                for y in rect.y..rect.y + rect.height {
                    for x in rect.x..rect.x + rect.width {
                        assert_ne!(
                            *canvas.pixels().get_pixel(x, y),
                            BACKGROUND,
                            "background at ({x}, {y}) in the preview at dpr {dpr}"
                        );
                    }
                }

                let result = editor.confirm().unwrap().into_export().unwrap();
                assert!(
                    result.pixels.pixels().all(|p| *p != BACKGROUND),
                    "background in the export at dpr {dpr}"
                );
            }
        }
    }

    #[test]
    fn test_banner_export_size() {
        let mut editor = open_editor(OutputContract::banner());
        let outcome = editor.confirm().unwrap();
        let result = outcome.into_export().unwrap();
        assert_eq!((result.width, result.height), (1000, 320));
    }

    #[test]
    fn test_second_open_is_busy() {
        let mut editor = open_editor(OutputContract::avatar());
        let err = editor
            .open(
                png_source(10, 10, [0, 0, 0, 255]),
                OutputContract::avatar(),
                Viewport::new(100.0, 100.0, 1.0),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Busy);
        assert!(editor.is_open());
        assert_eq!(editor.session().unwrap().bitmap().width(), 2000);
    }

    #[test]
    fn test_cancel_releases_bitmap() {
        let mut editor = open_editor(OutputContract::avatar());
        let first = editor.session().unwrap().bitmap().id();
        assert_eq!(editor.loader().live_bitmaps(), 1);

        assert!(editor.cancel().is_cancelled());
        assert!(!editor.is_open());
        assert_eq!(editor.loader().live_bitmaps(), 0);
        assert_eq!(editor.loader().live_references(), 0);

        editor
            .open(
                png_source(30, 20, [0, 0, 255, 255]),
                OutputContract::avatar(),
                Viewport::new(100.0, 100.0, 2.0),
            )
            .unwrap();
        assert_eq!(editor.loader().live_bitmaps(), 1);
        let session = editor.session().unwrap();
        assert_ne!(session.bitmap().id(), first);
        assert_eq!(session.bitmap().dimensions(), (30, 20));
    }

    #[test]
    fn test_load_failure_leaves_editor_closed() {
        let mut editor = Editor::new(EditorConfig::default());
        let err = editor
            .open(
                Source::Bytes(b"definitely not an image".to_vec()),
                OutputContract::avatar(),
                Viewport::new(100.0, 100.0, 1.0),
            )
            .unwrap_err();
        assert!(err.kind().is_load());
        assert!(!editor.is_open());
        assert_eq!(editor.loader().live_references(), 0);
    }

    #[test]
    fn test_invalid_contract_is_rejected_before_loading() {
        let mut editor = Editor::new(EditorConfig::default());
        let contract = OutputContract {
            target_size: 512,
            aspect_ratio: f64::NAN,
            ratio_locked: true,
        };
        let err = editor
            .open(png_source(4, 4, [1, 2, 3, 255]), contract, Viewport::new(100.0, 100.0, 1.0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidContract);
        assert_eq!(editor.loader().live_bitmaps(), 0);
    }

    #[test]
    fn test_events_need_a_session() {
        let mut editor = Editor::new(EditorConfig::default());
        let err = editor.handle(InputEvent::Reset).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOpen);
        assert_eq!(editor.confirm().unwrap_err().kind(), ErrorKind::NotOpen);
        assert!(editor.cancel().is_cancelled());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut editor = open_editor(OutputContract::avatar());
        let initial = *editor.session().unwrap().transform();

        editor.handle(InputEvent::PointerDown { x: 10.0, y: 10.0 }).unwrap();
        editor.handle(InputEvent::PointerMove { x: 60.0, y: -5.0 }).unwrap();
        editor.handle(InputEvent::PointerUp).unwrap();
        editor.handle(InputEvent::Wheel { delta_y: -1.0 }).unwrap();
        assert_ne!(*editor.session().unwrap().transform(), initial);

        editor.handle(InputEvent::Reset).unwrap();
        let once = *editor.session().unwrap().transform();
        editor.handle(InputEvent::Reset).unwrap();
        let twice = *editor.session().unwrap().transform();
        assert_eq!(once, initial);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resize_keeps_transform() {
        let mut editor = open_editor(OutputContract::avatar());
        let before = *editor.session().unwrap().transform();
        editor
            .handle(InputEvent::Resize(Viewport::new(800.0, 600.0, 1.0)))
            .unwrap();
        let session = editor.session().unwrap();
        assert_eq!(*session.transform(), before);
        assert_eq!(session.canvas().size(), (800, 600));
        assert_eq!(session.crop_window().width, 600.0 * 0.76);
    }

    #[test]
    fn test_oversized_resize_is_clamped() {
        let mut editor = open_editor(OutputContract::avatar());
        editor
            .handle(InputEvent::Resize(Viewport::new(100_000.0, 100_000.0, 4.0)))
            .unwrap();
        let side = crate::layout::MAX_CANVAS_SIDE;
        assert_eq!(editor.session().unwrap().canvas().size(), (side, side));
    }

    #[test]
    fn test_export_error_keeps_session_open() {
        let mut editor = open_editor(OutputContract::avatar());
        editor
            .handle(InputEvent::Resize(Viewport::new(0.0, 0.0, 1.0)))
            .unwrap();
        let err = editor.handle(InputEvent::Key(Key::Enter)).unwrap_err();
        assert!(err.kind().is_export());
        assert!(editor.is_open());

        editor
            .handle(InputEvent::Resize(Viewport::new(400.0, 300.0, 1.0)))
            .unwrap();
        let outcome = editor.handle(InputEvent::Key(Key::Enter)).unwrap();
        assert!(matches!(outcome, Some(Outcome::Confirmed(_))));
        assert!(!editor.is_open());
    }

    #[test]
    fn test_escape_cancels() {
        let mut editor = open_editor(OutputContract::avatar());
        let outcome = editor.handle(InputEvent::Key(Key::Escape)).unwrap();
        assert_eq!(outcome, Some(Outcome::Cancelled));
        assert!(!editor.is_open());
        assert_eq!(editor.loader().live_bitmaps(), 0);
    }

    #[test]
    fn test_slider_value() {
        let mut editor = open_editor(OutputContract::avatar());
        editor.handle(InputEvent::Slider(1.5)).unwrap();
        let session = editor.session().unwrap();
        assert_eq!(session.slider_value(editor.config()), "1.50");
        assert!(session.repaints() >= 2);
    }
}
