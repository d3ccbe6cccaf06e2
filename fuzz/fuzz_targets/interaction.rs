#![no_main]

use std::num::NonZeroU8;

use cropkit::{Editor, EditorConfig, OutputContract, Outcome, Source, Viewport};
use cropkit_fuzz::{FuzzEvent, StructuredImage, PIXEL_RATIOS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (StructuredImage, (u8, u8, u8), NonZeroU8, NonZeroU8, Vec<FuzzEvent>)| {
    let (image, (view_w, view_h, dpr_index), ratio_w, ratio_h, events) = input;
    let dpr = PIXEL_RATIOS[dpr_index as usize % PIXEL_RATIOS.len()];
    let viewport = Viewport::new(view_w as f64 * 2.0, view_h as f64 * 2.0, dpr);
    let ratio = ratio_w.get() as f64 / ratio_h.get() as f64;
    let contract = OutputContract::new(128, ratio, true).expect("ratio is positive and finite");

    let config = EditorConfig::default();
    let bounds = config.scale_bounds();
    let mut editor = Editor::new(config);
    editor
        .open(Source::Bytes(image.to_png()), contract, viewport)
        .expect("a valid PNG must open");

    for event in &events {
        let dpr = editor.session().unwrap().viewport().device_pixel_ratio;
        let outcome = editor.handle(event.to_input(dpr)).expect("session is open");
        assert!(outcome.is_none());
        let scale = editor.session().unwrap().transform().scale;
        assert!(scale >= bounds.min() && scale <= bounds.max());
    }

    let (width, height) = contract.output_size(editor.config().min_export_size);
    match editor.confirm() {
        Ok(Outcome::Confirmed(result)) => {
            assert_eq!((result.width, result.height), (width, height));
            assert!(!editor.is_open());
        }
        Ok(Outcome::Cancelled) => unreachable!("confirm never cancels"),
        // a collapsed viewport has no crop window
        Err(err) => {
            assert!(err.kind().is_export());
            assert!(editor.is_open());
        }
    }
    editor.close();
    assert_eq!(editor.loader().live_bitmaps(), 0);
});
