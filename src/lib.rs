//! `cropkit` is a pan/zoom image cropping engine.
//!
//! An [`Editor`](editor::Editor) loads a source image, lays out a fixed-ratio crop
//! window, lets the user drag and zoom the image underneath it, and exports exactly
//! what the window shows as a PNG at a requested size. [`compress`] then shrinks
//! and re-encodes the confirmed crop for upload.
//!
//! The interface is unstable while the `cropkit` binary is its main user.

#![forbid(unsafe_code)]

#[cfg(feature = "hardened_malloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod args;
pub mod bitmap;
pub mod compress;
pub mod config;
pub mod contract;
pub mod decode;
pub mod editor;
pub mod encoders;
pub mod error;
pub mod export;
pub mod filter;
pub mod help;
mod init;
pub mod interaction;
pub mod layout;
mod operations;
pub mod render;
pub mod script;
pub mod transform;
mod utils;

pub use config::EditorConfig;
pub use contract::OutputContract;
pub use decode::Source;
pub use editor::{Editor, Outcome};
pub use error::{CropError, ErrorKind};
pub use export::ExportResult;
pub use interaction::{InputEvent, Key};
pub use layout::Viewport;
