//! Process-wide setup of the image decoders.

use std::sync::Once;

static REGISTER_HOOKS: Once = Once::new();

/// Registers decoders that plug into `image` through hooks rather than features.
/// Safe to call any number of times; only the first call does anything.
pub fn init() {
    REGISTER_HOOKS.call_once(|| {
        #[cfg(feature = "jxl")]
        jxl_oxide::integration::register_image_decoding_hook();
    });
}
