//! Pixel operations shared by the exporter and the upload compressor.

pub mod crop;
pub mod resize;
